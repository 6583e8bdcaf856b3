//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, PageRequest},
};

use super::{BookStore, UNIQUE_VIOLATION};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Append an ILIKE substring condition for each non-empty filter field
fn push_filter_conditions<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a BookFilter) {
    for (column, value) in [
        ("title", &filter.title),
        ("author", &filter.author),
        ("isbn", &filter.isbn),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            builder
                .push(" AND ")
                .push(column)
                .push(" ILIKE ")
                .push_bind(format!("%{}%", value));
        }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn exists_by_isbn(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, isbn FROM books WHERE isbn = $1",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let book =
            sqlx::query_as::<_, Book>("SELECT id, title, author, isbn FROM books WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(book)
    }

    async fn insert(&self, book: &Book) -> AppResult<Book> {
        let result = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn)
            VALUES ($1, $2, $3)
            RETURNING id, title, author, isbn
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(book) => Ok(book),
            // The unique index on isbn is the authoritative guard; a violation
            // here surfaces the same error as the rules-layer pre-check.
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::BusinessRule("Isbn already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let id = book
            .id
            .ok_or_else(|| AppError::InvalidArgument("Book id cant be null".to_string()))?;

        let result = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET title = $1, author = $2, isbn = $3
            WHERE id = $4
            RETURNING id, title, author, isbn
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(book)) => Ok(book),
            Ok(None) => Err(AppError::NotFound(format!("Book with id {} not found", id))),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::BusinessRule("Isbn already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn find_page(
        &self,
        filter: &BookFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<Book>, i64)> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM books WHERE 1=1");
        push_filter_conditions(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select_builder =
            QueryBuilder::new("SELECT id, title, author, isbn FROM books WHERE 1=1");
        push_filter_conditions(&mut select_builder, filter);
        select_builder
            .push(" ORDER BY title LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let books = select_builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }
}
