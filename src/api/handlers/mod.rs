//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod books;
pub mod health;

pub use books::{
    create_book_handler, delete_book_handler, get_book_handler, list_all_books_handler,
    list_books_handler, search_books_handler, update_book_handler,
};
pub use health::health_handler;
