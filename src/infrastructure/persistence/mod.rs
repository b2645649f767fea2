//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgBookRepository`] - Book storage, pagination and filtered search

pub mod pg_book_repository;

pub use pg_book_repository::PgBookRepository;
