//! Loan lifecycle rules
//!
//! Enforces the one-active-loan-per-book invariant on save and drives the
//! one-way created -> returned transition. The double-loan check is a
//! read-then-write fast path, like the isbn check in the books service.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{Loan, LoanFilter, LoanWithBook, PageRequest},
    repository::LoanStore,
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn LoanStore>,
    /// Days after the loan date before a loan counts as late
    overdue_grace_days: i64,
}

impl LoansService {
    pub fn new(store: Arc<dyn LoanStore>, overdue_grace_days: i64) -> Self {
        Self {
            store,
            overdue_grace_days,
        }
    }

    /// Persist a new loan, rejecting a second active loan for the same book
    pub async fn save(&self, loan: Loan) -> AppResult<Loan> {
        if self.store.exists_unreturned_for_book(loan.book_id).await? {
            return Err(AppError::BusinessRule("Book already loaned".to_string()));
        }
        self.store.insert(&loan).await
    }

    /// Get a loan by id; absent id is not an error
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Loan>> {
        self.store.find_by_id(id).await
    }

    /// Persist the given loan state; the loan must carry an id
    pub async fn update(&self, loan: Loan) -> AppResult<Loan> {
        if loan.id.is_none() {
            return Err(AppError::InvalidArgument("Loan id cant be null".to_string()));
        }
        self.store.update(&loan).await
    }

    /// Close (or reopen) a loan by id. The only mutation the API exposes
    /// after creation.
    pub async fn mark_returned(&self, id: i64, returned: bool) -> AppResult<Loan> {
        let mut loan = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        loan.returned = Some(returned);
        self.store.update(&loan).await
    }

    /// Page of loans matching the book isbn or the customer name, joined
    /// with their books
    pub async fn find(
        &self,
        filter: &LoanFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<LoanWithBook>, i64)> {
        self.store.find_page(filter, page).await
    }

    /// All outstanding loans older than the grace period
    pub async fn get_all_late_loans(&self) -> AppResult<Vec<Loan>> {
        let cutoff = Utc::now().date_naive() - Duration::days(self.overdue_grace_days);
        self.store.find_unreturned_before(cutoff).await
    }
}
