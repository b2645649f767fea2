//! API route configuration.

use crate::api::handlers::{
    create_book_handler, delete_book_handler, get_book_handler, list_all_books_handler,
    list_books_handler, search_books_handler, update_book_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Book CRUD routes.
///
/// # Endpoints
///
/// - `POST   /books`          - Create a book
/// - `GET    /books`          - One page of books (`skip`, `limit`)
/// - `GET    /books/all`      - Every book
/// - `GET    /books/search`   - Filtered, paginated search
/// - `GET    /books/{id}`     - One book (cache-aside)
/// - `PUT    /books/{id}`     - Replace a book
/// - `DELETE /books/{id}`     - Delete a book
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books_handler).post(create_book_handler))
        .route("/books/all", get(list_all_books_handler))
        .route("/books/search", get(search_books_handler))
        .route(
            "/books/{id}",
            get(get_book_handler)
                .put(update_book_handler)
                .delete(delete_book_handler),
        )
}
