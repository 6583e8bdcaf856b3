//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::{page::default_page_size, Book, Loan, LoanFilter, LoanWithBook, Page, PageRequest},
};

/// Create loan request
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateLoanRequest {
    /// ISBN of the book to lend
    #[validate(length(min = 1, message = "must not be empty"))]
    pub isbn: String,
    /// Customer name
    #[validate(length(min = 1, message = "must not be empty"))]
    pub customer: String,
    /// Customer email, used for overdue reminders
    #[validate(length(min = 1, message = "must not be empty"))]
    pub email: String,
}

/// Created loan response
#[derive(Serialize, ToSchema)]
pub struct LoanCreatedResponse {
    /// Assigned loan ID
    pub id: i64,
}

/// Mark-returned request
#[derive(Deserialize, ToSchema)]
pub struct ReturnedRequest {
    pub returned: bool,
}

/// Loan with its book, as listed by the filtered search
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    pub id: i64,
    pub customer: String,
    pub customer_email: String,
    pub loan_date: NaiveDate,
    pub returned: Option<bool>,
    pub book: Book,
}

impl LoanResponse {
    fn from_entry(entry: LoanWithBook) -> AppResult<Self> {
        let id = entry
            .loan
            .id
            .ok_or_else(|| AppError::Internal("Loan id is null".to_string()))?;
        Ok(Self {
            id,
            customer: entry.loan.customer,
            customer_email: entry.loan.customer_email,
            loan_date: entry.loan.loan_date,
            returned: entry.loan.returned,
            book: entry.book,
        })
    }
}

/// Query parameters for loan search
#[derive(Deserialize)]
pub struct ListLoansQuery {
    pub isbn: Option<String>,
    pub customer: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

/// Create a new loan (lend a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanCreatedResponse),
        (status = 400, description = "Unknown isbn, book already loaned or validation failed", body = ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanCreatedResponse>)> {
    request.validate()?;

    let book = state
        .services
        .books
        .get_book_by_isbn(&request.isbn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Book not found for passed isbn".to_string()))?;

    let book_id = book
        .id
        .ok_or_else(|| AppError::Internal("Book id is null".to_string()))?;

    let loan = Loan {
        id: None,
        book_id,
        customer: request.customer,
        customer_email: request.email,
        loan_date: Utc::now().date_naive(),
        returned: None,
    };

    let created = state.services.loans.save(loan).await?;
    let id = created
        .id
        .ok_or_else(|| AppError::Internal("Loan id is null".to_string()))?;

    Ok((StatusCode::CREATED, Json(LoanCreatedResponse { id })))
}

/// Mark a loan returned (or reopen it)
#[utoipa::path(
    patch,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = ReturnedRequest,
    responses(
        (status = 200, description = "Loan updated"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ReturnedRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .loans
        .mark_returned(id, request.returned)
        .await?;
    Ok(StatusCode::OK)
}

/// List loans filtered by book isbn or customer
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(
        ("isbn" = Option<String>, Query, description = "Exact match on the book isbn"),
        ("customer" = Option<String>, Query, description = "Exact match on the customer name"),
        ("page" = Option<i64>, Query, description = "Page number, zero-based (default: 0)"),
        ("size" = Option<i64>, Query, description = "Page size (default: 20)")
    ),
    responses(
        (status = 200, description = "Page of loans", body = Page<LoanResponse>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<ListLoansQuery>,
) -> AppResult<Json<Page<LoanResponse>>> {
    let filter = LoanFilter {
        isbn: query.isbn,
        customer: query.customer,
    };
    let page = PageRequest::of(query.page, query.size);

    let (loans, total) = state.services.loans.find(&filter, &page).await?;

    let mut content = Vec::with_capacity(loans.len());
    for entry in loans {
        content.push(LoanResponse::from_entry(entry)?);
    }

    Ok(Json(Page::new(content, total, &page)))
}
