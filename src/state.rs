//! Shared handler state.

use std::sync::Arc;

use crate::application::cache_aside::{CacheFailurePolicy, EntityCache};
use crate::application::services::BookService;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::PgBookRepository;

/// Handles injected into every request handler.
///
/// Cloning is cheap: every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub book_service: Arc<BookService<PgBookRepository>>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(book_service: Arc<BookService<PgBookRepository>>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            book_service,
            cache,
        }
    }

    /// Wires the book service over a repository and a cache backend.
    pub fn build(
        repository: Arc<PgBookRepository>,
        cache: Arc<dyn CacheService>,
        settings: CacheSettings,
    ) -> Self {
        let entity_cache = EntityCache::new(
            cache.clone(),
            settings.key_prefix,
            settings.ttl_seconds,
            settings.failure_policy,
        );

        let mut service = BookService::new(repository, entity_cache);
        if settings.serialize_writes {
            service = service.with_serialized_writes();
        }

        Self::new(Arc::new(service), cache)
    }
}

/// Cache behaviour knobs, usually taken from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub key_prefix: String,
    pub ttl_seconds: u64,
    pub failure_policy: CacheFailurePolicy,
    pub serialize_writes: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: "book".to_string(),
            ttl_seconds: 3600,
            failure_policy: CacheFailurePolicy::Tolerate,
            serialize_writes: false,
        }
    }
}

impl From<&crate::config::Config> for CacheSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            key_prefix: config.cache_key_prefix.clone(),
            ttl_seconds: config.cache_ttl_seconds,
            failure_policy: config.cache_failure_policy,
            serialize_writes: config.serialize_writes,
        }
    }
}
