//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;

/// Loan model from database
///
/// `returned` is nullable: NULL or false means the loan is outstanding,
/// true means it has been closed. `loan_date` is set on creation and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: Option<i64>,
    pub book_id: i64,
    pub customer: String,
    pub customer_email: String,
    pub loan_date: NaiveDate,
    pub returned: Option<bool>,
}

/// A loan joined with its book, as produced by the filtered loan search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanWithBook {
    pub loan: Loan,
    pub book: Book,
}

/// Filter for loan search: matches loans whose book isbn equals `isbn` OR
/// whose customer equals `customer`. Absent fields drop their side of the OR.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanFilter {
    pub isbn: Option<String>,
    pub customer: Option<String>,
}
