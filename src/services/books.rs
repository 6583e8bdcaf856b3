//! Book lifecycle rules
//!
//! Enforces isbn uniqueness on save and the id-required contract on update
//! and delete. The duplicate check is a read-then-write fast path; the unique
//! index on `books.isbn` remains the authoritative guard under concurrency.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, PageRequest},
    repository::BookStore,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Persist a new book, rejecting a duplicate isbn
    pub async fn save(&self, book: Book) -> AppResult<Book> {
        if self.store.exists_by_isbn(&book.isbn).await? {
            return Err(AppError::BusinessRule("Isbn already registered".to_string()));
        }
        self.store.insert(&book).await
    }

    /// Get a book by id; absent id is not an error
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        self.store.find_by_id(id).await
    }

    /// Persist the given book state verbatim; the book must carry an id
    pub async fn update(&self, book: Book) -> AppResult<Book> {
        if book.id.is_none() {
            return Err(AppError::InvalidArgument("Book id cant be null".to_string()));
        }
        self.store.update(&book).await
    }

    /// Remove a book; the book must carry an id
    pub async fn delete(&self, book: &Book) -> AppResult<()> {
        let id = book
            .id
            .ok_or_else(|| AppError::InvalidArgument("Book id cant be null".to_string()))?;
        self.store.delete(id).await
    }

    /// Filtered page of books; each non-empty filter field matches by
    /// case-insensitive substring
    pub async fn find(
        &self,
        filter: &BookFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<Book>, i64)> {
        self.store.find_page(filter, page).await
    }

    pub async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        self.store.find_by_isbn(isbn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockBookStore;

    fn a_book(isbn: &str) -> Book {
        Book {
            id: None,
            title: "As aventuras".to_string(),
            author: "Fulano".to_string(),
            isbn: isbn.to_string(),
        }
    }

    #[tokio::test]
    async fn save_assigns_id() {
        let mut store = MockBookStore::new();
        store.expect_exists_by_isbn().returning(|_| Ok(false));
        store
            .expect_insert()
            .withf(|b| b.isbn == "123")
            .returning(|b| {
                Ok(Book {
                    id: Some(11),
                    ..b.clone()
                })
            });

        let service = BooksService::new(Arc::new(store));
        let saved = service.save(a_book("123")).await.unwrap();

        assert_eq!(saved.id, Some(11));
        assert_eq!(saved.isbn, "123");
        assert_eq!(saved.title, "As aventuras");
        assert_eq!(saved.author, "Fulano");
    }

    #[tokio::test]
    async fn save_rejects_duplicate_isbn_without_inserting() {
        let mut store = MockBookStore::new();
        store.expect_exists_by_isbn().returning(|_| Ok(true));
        store.expect_insert().never();

        let service = BooksService::new(Arc::new(store));
        let err = service.save(a_book("123")).await.unwrap_err();

        assert!(matches!(err, AppError::BusinessRule(msg) if msg == "Isbn already registered"));
    }

    #[tokio::test]
    async fn get_by_id_returns_book_when_present() {
        let mut store = MockBookStore::new();
        store.expect_find_by_id().with(mockall::predicate::eq(1)).returning(|_| {
            Ok(Some(Book {
                id: Some(1),
                ..a_book("123")
            }))
        });

        let service = BooksService::new(Arc::new(store));
        let found = service.get_by_id(1).await.unwrap().unwrap();

        assert_eq!(found.id, Some(1));
        assert_eq!(found.isbn, "123");
    }

    #[tokio::test]
    async fn get_by_id_returns_none_when_absent() {
        let mut store = MockBookStore::new();
        store.expect_find_by_id().returning(|_| Ok(None));

        let service = BooksService::new(Arc::new(store));
        assert!(service.get_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_persists_given_state() {
        let mut store = MockBookStore::new();
        store
            .expect_update()
            .withf(|b| b.id == Some(1) && b.title == "As aventuras")
            .returning(|b| Ok(b.clone()));

        let service = BooksService::new(Arc::new(store));
        let book = Book {
            id: Some(1),
            ..a_book("123")
        };
        let updated = service.update(book.clone()).await.unwrap();

        assert_eq!(updated, book);
    }

    #[tokio::test]
    async fn update_without_id_is_rejected_before_the_store() {
        let mut store = MockBookStore::new();
        store.expect_update().never();

        let service = BooksService::new(Arc::new(store));
        let err = service.update(a_book("123")).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn delete_removes_by_id() {
        let mut store = MockBookStore::new();
        store
            .expect_delete()
            .with(mockall::predicate::eq(1))
            .times(1)
            .returning(|_| Ok(()));

        let service = BooksService::new(Arc::new(store));
        let book = Book {
            id: Some(1),
            ..a_book("123")
        };
        service.delete(&book).await.unwrap();
    }

    #[tokio::test]
    async fn delete_without_id_is_rejected_before_the_store() {
        let mut store = MockBookStore::new();
        store.expect_delete().never();

        let service = BooksService::new(Arc::new(store));
        let err = service.delete(&a_book("123")).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn find_returns_page_content_and_total() {
        let mut store = MockBookStore::new();
        store
            .expect_find_page()
            .withf(|filter, page| {
                filter.title.as_deref() == Some("aventuras") && page.page == 0 && page.size == 10
            })
            .returning(|_, _| {
                Ok((
                    vec![Book {
                        id: Some(1),
                        ..a_book("123")
                    }],
                    1,
                ))
            });

        let service = BooksService::new(Arc::new(store));
        let filter = BookFilter {
            title: Some("aventuras".to_string()),
            ..Default::default()
        };
        let (books, total) = service.find(&filter, &PageRequest::of(0, 10)).await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn get_book_by_isbn_delegates_to_store() {
        let mut store = MockBookStore::new();
        store
            .expect_find_by_isbn()
            .with(mockall::predicate::eq("1230"))
            .times(1)
            .returning(|isbn| {
                Ok(Some(Book {
                    id: Some(1),
                    ..a_book(isbn)
                }))
            });

        let service = BooksService::new(Arc::new(store));
        let book = service.get_book_by_isbn("1230").await.unwrap().unwrap();

        assert_eq!(book.id, Some(1));
        assert_eq!(book.isbn, "1230");
    }
}
