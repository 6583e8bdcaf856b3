//! API handlers for the biblio REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
