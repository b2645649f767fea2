//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. The book itself is serialized directly from
//! [`crate::domain::entities::Book`].

pub mod book;
pub mod health;
pub mod pagination;
