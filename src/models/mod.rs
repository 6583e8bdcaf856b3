//! Data models for the biblio server

pub mod book;
pub mod loan;
pub mod page;

// Re-export commonly used types
pub use book::{Book, BookFilter};
pub use loan::{Loan, LoanFilter, LoanWithBook};
pub use page::{Page, PageRequest, Pageable};
