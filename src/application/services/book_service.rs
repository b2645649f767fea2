//! Book CRUD with cache-aside reads and write-through cache updates.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::OwnedMutexGuard;

use crate::application::cache_aside::{CacheStep, EntityCache};
use crate::application::write_locks::KeyedLocks;
use crate::domain::entities::{Book, BookFilter, NewBook};
use crate::domain::repositories::BookRepository;
use crate::error::AppError;

/// Service binding the book store and the book cache.
///
/// The repository is authoritative. Writes commit to the store first and touch
/// the cache second, with no atomicity between the two steps; a missing or
/// failed cache write is always safe because reads fall back to the store.
/// List operations never consult the cache.
pub struct BookService<R: BookRepository> {
    repository: Arc<R>,
    cache: EntityCache<Book>,
    write_locks: Option<KeyedLocks>,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a new book service.
    pub fn new(repository: Arc<R>, cache: EntityCache<Book>) -> Self {
        Self {
            repository,
            cache,
            write_locks: None,
        }
    }

    /// Serializes update, delete and cache-miss promotion per book id within
    /// this process, so the store and the cache agree on the last writer and a
    /// deleted book is never promoted back into the cache.
    ///
    /// Without it, a read that loaded a row just before a concurrent delete can
    /// re-cache the deleted snapshot until its TTL runs out.
    pub fn with_serialized_writes(mut self) -> Self {
        self.write_locks = Some(KeyedLocks::new());
        self
    }

    pub fn cache(&self) -> &EntityCache<Book> {
        &self.cache
    }

    async fn lock(&self, id: i64) -> Option<OwnedMutexGuard<()>> {
        match &self.write_locks {
            Some(locks) => Some(locks.lock(id).await),
            None => None,
        }
    }

    fn not_found(id: i64) -> AppError {
        AppError::not_found("Book not found!", json!({ "id": id }))
    }

    fn none_found() -> AppError {
        AppError::not_found("No book found", json!({}))
    }

    /// Stores a new book, then caches its snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors, or on a cache failure
    /// under the propagate policy (the book stays created).
    pub async fn create(&self, attributes: NewBook) -> Result<Book, AppError> {
        let book = self.repository.create(attributes).await?;
        tracing::info!(id = book.id, "Book created");

        let stored = self.cache.store(book.id, &book).await;
        self.cache.settle(CacheStep::Write, book.id, stored)?;

        Ok(book)
    }

    /// Returns a book, preferring the cached snapshot.
    ///
    /// On a miss the book is read from the store and promoted into the cache,
    /// under the per-id lock when writes are serialized. A cached snapshot is
    /// returned without checking the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is not stored.
    pub async fn get_by_id(&self, id: i64) -> Result<Book, AppError> {
        let cached = self.cache.fetch(id).await;
        if let Some(Some(book)) = self.cache.settle(CacheStep::Read, id, cached)? {
            tracing::debug!(id, "Book served from cache");
            return Ok(book);
        }

        let _guard = self.lock(id).await;
        let book = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        tracing::debug!(id, "Book served from database");

        let promoted = self.cache.store(id, &book).await;
        self.cache.settle(CacheStep::Write, id, promoted)?;

        Ok(book)
    }

    /// Replaces every attribute of a book, then refreshes its cached snapshot.
    ///
    /// Fields are not merged with the previous record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is not stored.
    pub async fn update(&self, id: i64, attributes: NewBook) -> Result<Book, AppError> {
        let _guard = self.lock(id).await;

        if self.repository.find_by_id(id).await?.is_none() {
            return Err(Self::not_found(id));
        }

        // The row can disappear between the lookup and the write.
        let book = self
            .repository
            .update(id, attributes)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        tracing::info!(id, "Book updated");

        let stored = self.cache.store(id, &book).await;
        self.cache.settle(CacheStep::Write, id, stored)?;

        Ok(book)
    }

    /// Deletes a book, then removes its cached snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is not stored.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let _guard = self.lock(id).await;

        if self.repository.find_by_id(id).await?.is_none() {
            return Err(Self::not_found(id));
        }

        if !self.repository.delete(id).await? {
            return Err(Self::not_found(id));
        }
        tracing::info!(id, "Book deleted");

        let evicted = self.cache.evict(id).await;
        self.cache.settle(CacheStep::Evict, id, evicted)?;

        Ok(())
    }

    /// Returns up to `limit` books after skipping `skip`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the page is empty.
    pub async fn list_page(&self, skip: i64, limit: i64) -> Result<Vec<Book>, AppError> {
        let books = self.repository.list(skip, limit).await?;
        tracing::debug!(skip, limit, count = books.len(), "Listed books");

        if books.is_empty() {
            return Err(Self::none_found());
        }
        Ok(books)
    }

    /// Returns every stored book.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the store is empty.
    pub async fn list_all(&self) -> Result<Vec<Book>, AppError> {
        let books = self.repository.list_all().await?;

        if books.is_empty() {
            return Err(Self::none_found());
        }
        Ok(books)
    }

    /// Returns the books matching every set predicate, paginated after filtering.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the page is empty.
    pub async fn list_filtered(
        &self,
        filter: &BookFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Book>, AppError> {
        let books = self.repository.search(filter, skip, limit).await?;
        tracing::debug!(?filter, skip, limit, count = books.len(), "Searched books");

        if books.is_empty() {
            return Err(AppError::not_found("No book found!", json!({})));
        }
        Ok(books)
    }

    /// Counts stored books. Also used as the database health probe.
    pub async fn count(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }

    /// Drops the cached snapshot of a book without touching the store.
    ///
    /// For records changed outside this service.
    pub async fn invalidate(&self, id: i64) -> Result<(), AppError> {
        self.cache.evict(id).await?;
        Ok(())
    }

    /// Promotes every stored book into the cache and returns how many were written.
    ///
    /// # Errors
    ///
    /// Fails on the first store or cache error.
    pub async fn warm_cache(&self) -> Result<usize, AppError> {
        let books = self.repository.list_all().await?;

        for book in &books {
            self.cache.store(book.id, book).await?;
        }

        tracing::info!(count = books.len(), "Cache warmed");
        Ok(books.len())
    }
}
