#![allow(dead_code)]

use book_catalog::domain::entities::NewBook;
use book_catalog::infrastructure::cache::{CacheService, MemoryCache};
use book_catalog::infrastructure::persistence::PgBookRepository;
use book_catalog::state::{AppState, CacheSettings};
use sqlx::PgPool;
use std::sync::Arc;

pub fn new_book(title: &str, category: &str, pages: i32) -> NewBook {
    NewBook {
        title: title.to_string(),
        description: format!("Notes on {}", title),
        author: "Octavia E. Butler".to_string(),
        category: category.to_string(),
        pages,
        available: true,
    }
}

/// Inserts a row directly, bypassing the service and its cache.
pub async fn insert_book(pool: &PgPool, title: &str, category: &str, pages: i32) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO books (title, description, author, category, pages, available) \
         VALUES ($1, '', 'Octavia E. Butler', $2, $3, TRUE) RETURNING id",
    )
    .bind(title)
    .bind(category)
    .bind(pages)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_books(pool: &PgPool, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        ids.push(insert_book(pool, &format!("Book {}", i + 1), "Fiction", 100 + i as i32).await);
    }
    ids
}

pub fn create_test_state(pool: PgPool) -> (AppState, Arc<MemoryCache>) {
    create_test_state_with(pool, CacheSettings::default())
}

pub fn create_test_state_with(pool: PgPool, settings: CacheSettings) -> (AppState, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new(settings.ttl_seconds));
    let repository = Arc::new(PgBookRepository::new(Arc::new(pool)));
    let state = AppState::build(
        repository,
        cache.clone() as Arc<dyn CacheService>,
        settings,
    );
    (state, cache)
}
