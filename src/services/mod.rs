//! Business logic services

pub mod books;
pub mod email;
pub mod loans;
pub mod notifier;

use std::sync::Arc;

use crate::{
    config::{EmailConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub loans: loans::LoansService,
    pub email: email::EmailService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, email_config: EmailConfig, loans_config: &LoansConfig) -> Self {
        Self {
            books: books::BooksService::new(Arc::new(repository.books.clone())),
            loans: loans::LoansService::new(
                Arc::new(repository.loans),
                loans_config.overdue_grace_days,
            ),
            email: email::EmailService::new(email_config),
        }
    }
}
