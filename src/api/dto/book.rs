//! DTOs for book endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::NewBook;

/// Request body for `POST /books` and `PUT /books/{id}`.
///
/// `PUT` replaces the whole record: an omitted `description` becomes empty and
/// an omitted `available` becomes `true`, whatever the stored values were.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,

    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: String,

    #[validate(length(min = 1, max = 255, message = "Category must be 1-255 characters"))]
    pub category: String,

    #[validate(range(min = 0, message = "Pages must not be negative"))]
    pub pages: i32,

    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl From<BookRequest> for NewBook {
    fn from(r: BookRequest) -> Self {
        NewBook {
            title: r.title,
            description: r.description,
            author: r.author,
            category: r.category,
            pages: r.pages,
            available: r.available,
        }
    }
}

/// Confirmation returned by `DELETE /books/{id}`.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub detail: String,
}

impl DeleteResponse {
    pub fn book_deleted() -> Self {
        Self {
            detail: "Book deleted!".to_string(),
        }
    }
}
