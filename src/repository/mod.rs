//! Repository layer for database operations
//!
//! The `BookStore` and `LoanStore` traits are the seams the rules services
//! depend on; `BooksRepository` and `LoansRepository` are their Postgres
//! implementations.

pub mod books;
pub mod loans;

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, BookFilter, Loan, LoanFilter, LoanWithBook, PageRequest},
};

/// Persistence operations for books
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn exists_by_isbn(&self, isbn: &str) -> AppResult<bool>;
    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>>;
    /// Insert a new book and return it with its assigned id
    async fn insert(&self, book: &Book) -> AppResult<Book>;
    /// Persist the given state verbatim; the book must carry an id
    async fn update(&self, book: &Book) -> AppResult<Book>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    /// Filtered page plus total matching count
    async fn find_page(
        &self,
        filter: &BookFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<Book>, i64)>;
}

/// Persistence operations for loans
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Loan>>;
    /// Insert a new loan and return it with its assigned id
    async fn insert(&self, loan: &Loan) -> AppResult<Loan>;
    async fn update(&self, loan: &Loan) -> AppResult<Loan>;
    /// Whether the book has a loan with `returned` not true
    async fn exists_unreturned_for_book(&self, book_id: i64) -> AppResult<bool>;
    /// Unreturned loans with a loan date strictly before the cutoff
    async fn find_unreturned_before(&self, cutoff: NaiveDate) -> AppResult<Vec<Loan>>;
    /// Loans whose book isbn or customer matches the filter, with their books
    async fn find_page(
        &self,
        filter: &LoanFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<LoanWithBook>, i64)>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }
}
