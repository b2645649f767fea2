//! Repository trait for book data access.

use crate::domain::entities::{Book, BookFilter, NewBook};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the durable book store.
///
/// This is the authoritative record set. Every method may fail with
/// [`AppError::Internal`] (connectivity) or [`AppError::Validation`] (check
/// constraint violation); absence is reported through `Option`/`bool`, never
/// as an error.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgBookRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_book.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Inserts a new book and returns it with its assigned id.
    async fn create(&self, new_book: NewBook) -> Result<Book, AppError>;

    /// Finds a book by primary key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Book))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, AppError>;

    /// Returns up to `limit` books after skipping `skip`, ordered by id.
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Book>, AppError>;

    /// Returns every stored book, ordered by id.
    async fn list_all(&self) -> Result<Vec<Book>, AppError>;

    /// Applies the filter predicates, then `skip`/`limit`.
    async fn search(
        &self,
        filter: &BookFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Book>, AppError>;

    /// Replaces every attribute of the book with `attributes`.
    ///
    /// Returns `Ok(None)` if no row has this id.
    async fn update(&self, id: i64, attributes: NewBook) -> Result<Option<Book>, AppError>;

    /// Deletes a book.
    ///
    /// Returns `Ok(true)` if a row was removed, `Ok(false)` if none matched.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Counts stored books.
    async fn count(&self) -> Result<i64, AppError>;
}
