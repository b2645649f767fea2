//! Application layer: cache-aside orchestration over the domain repositories.
//!
//! # Modules
//!
//! - [`services`] - [`services::BookService`], the book CRUD entry point
//! - [`cache_aside`] - Typed entity cache and the cache failure policy
//! - [`write_locks`] - Optional per-id serialization of write sequences

pub mod cache_aside;
pub mod services;
pub mod write_locks;
