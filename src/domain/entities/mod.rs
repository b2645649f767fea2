//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without persistence or caching concerns.
//!
//! # Entity Types
//!
//! - [`Book`] - A stored book record
//! - [`NewBook`] - The full attribute set used for creates and full-replace updates
//! - [`BookFilter`] - Optional conjunctive search predicates

pub mod book;

pub use book::{Book, BookFilter, NewBook};
