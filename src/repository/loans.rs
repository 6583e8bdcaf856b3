//! Loans repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan, LoanFilter, LoanWithBook, PageRequest},
};

use super::{LoanStore, UNIQUE_VIOLATION};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Append the isbn-or-customer condition when the filter carries any field.
/// Both matches are exact; two set fields combine with OR.
fn push_filter_conditions<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a LoanFilter) {
    let isbn = filter.isbn.as_deref().filter(|v| !v.is_empty());
    let customer = filter.customer.as_deref().filter(|v| !v.is_empty());

    match (isbn, customer) {
        (Some(isbn), Some(customer)) => {
            builder
                .push(" AND (b.isbn = ")
                .push_bind(isbn)
                .push(" OR l.customer = ")
                .push_bind(customer)
                .push(")");
        }
        (Some(isbn), None) => {
            builder.push(" AND b.isbn = ").push_bind(isbn);
        }
        (None, Some(customer)) => {
            builder.push(" AND l.customer = ").push_bind(customer);
        }
        (None, None) => {}
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT id, book_id, customer, customer_email, loan_date, returned FROM loans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn insert(&self, loan: &Loan) -> AppResult<Loan> {
        let result = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, customer, customer_email, loan_date, returned)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, book_id, customer, customer_email, loan_date, returned
            "#,
        )
        .bind(loan.book_id)
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.loan_date)
        .bind(loan.returned)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(stored) => Ok(stored),
            // The partial unique index on unreturned loans is the authoritative
            // guard; a violation here surfaces the same error as the
            // rules-layer pre-check.
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::BusinessRule("Book already loaned".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, loan: &Loan) -> AppResult<Loan> {
        let id = loan
            .id
            .ok_or_else(|| AppError::InvalidArgument("Loan id cant be null".to_string()))?;

        // loan_date is immutable once created; it is deliberately not updated
        let result = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET book_id = $1, customer = $2, customer_email = $3, returned = $4
            WHERE id = $5
            RETURNING id, book_id, customer, customer_email, loan_date, returned
            "#,
        )
        .bind(loan.book_id)
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.returned)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(stored)) => Ok(stored),
            Ok(None) => Err(AppError::NotFound(format!("Loan with id {} not found", id))),
            // Reopening a loan collides with the partial unique index when the
            // book has another active loan.
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::BusinessRule("Book already loaned".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists_unreturned_for_book(&self, book_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND returned IS NOT TRUE)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_unreturned_before(&self, cutoff: NaiveDate) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, customer, customer_email, loan_date, returned
            FROM loans
            WHERE loan_date < $1 AND returned IS NOT TRUE
            ORDER BY loan_date
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    async fn find_page(
        &self,
        filter: &LoanFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<LoanWithBook>, i64)> {
        let mut count_builder = QueryBuilder::new(
            "SELECT COUNT(*) FROM loans l JOIN books b ON b.id = l.book_id WHERE 1=1",
        );
        push_filter_conditions(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select_builder = QueryBuilder::new(
            r#"
            SELECT l.id, l.book_id, l.customer, l.customer_email, l.loan_date, l.returned,
                   b.id as b_id, b.title as b_title, b.author as b_author, b.isbn as b_isbn
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE 1=1
            "#,
        );
        push_filter_conditions(&mut select_builder, filter);
        select_builder
            .push(" ORDER BY l.loan_date, l.id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select_builder.build().fetch_all(&self.pool).await?;

        let loans = rows
            .iter()
            .map(|row| LoanWithBook {
                loan: Loan {
                    id: row.get("id"),
                    book_id: row.get("book_id"),
                    customer: row.get("customer"),
                    customer_email: row.get("customer_email"),
                    loan_date: row.get("loan_date"),
                    returned: row.get("returned"),
                },
                book: Book {
                    id: row.get("b_id"),
                    title: row.get("b_title"),
                    author: row.get("b_author"),
                    isbn: row.get("b_isbn"),
                },
            })
            .collect();

        Ok((loans, total))
    }
}
