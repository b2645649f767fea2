//! Handlers for book CRUD endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::book::{BookRequest, DeleteResponse};
use crate::api::dto::pagination::{
    DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT, PageParams, SearchParams,
};
use crate::domain::entities::Book;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a book.
///
/// # Endpoint
///
/// `POST /books`
///
/// # Request Body
///
/// ```json
/// {
///   "title": "The Left Hand of Darkness",
///   "description": "Winter",
///   "author": "Ursula K. Le Guin",
///   "category": "Science Fiction",
///   "pages": 304,
///   "available": true
/// }
/// ```
///
/// # Cache
///
/// The new book is cached immediately under `book:{id}`.
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
pub async fn create_book_handler(
    State(state): State<AppState>,
    Json(payload): Json<BookRequest>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    payload.validate()?;

    let book = state.book_service.create(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// Returns one book, from the cache when possible.
///
/// # Endpoint
///
/// `GET /books/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the book doesn't exist.
pub async fn get_book_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Book>, AppError> {
    let book = state.book_service.get_by_id(id).await?;
    Ok(Json(book))
}

/// Replaces every attribute of a book.
///
/// # Endpoint
///
/// `PUT /books/{id}`
///
/// Attributes omitted from the body take their defaults; nothing is kept from
/// the stored record.
///
/// # Cache
///
/// The cached snapshot is overwritten with the updated book.
///
/// # Errors
///
/// Returns 404 Not Found if the book doesn't exist.
/// Returns 400 Bad Request if validation fails.
pub async fn update_book_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<BookRequest>,
) -> Result<Json<Book>, AppError> {
    payload.validate()?;

    let book = state.book_service.update(id, payload.into()).await?;
    Ok(Json(book))
}

/// Deletes a book.
///
/// # Endpoint
///
/// `DELETE /books/{id}`
///
/// # Cache
///
/// The cached snapshot is removed immediately, not left to expire.
///
/// # Errors
///
/// Returns 404 Not Found if the book doesn't exist.
pub async fn delete_book_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.book_service.delete(id).await?;
    Ok(Json(DeleteResponse::book_deleted()))
}

/// Lists one page of books. The cache is not consulted.
///
/// # Endpoint
///
/// `GET /books?skip=0&limit=20`
///
/// # Errors
///
/// Returns 404 Not Found if the page is empty.
pub async fn list_books_handler(
    Query(params): Query<PageParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Book>>, AppError> {
    let (skip, limit) = params.resolve(DEFAULT_LIST_LIMIT)?;

    let books = state.book_service.list_page(skip, limit).await?;
    Ok(Json(books))
}

/// Lists every book. The cache is not consulted.
///
/// # Endpoint
///
/// `GET /books/all`
///
/// # Errors
///
/// Returns 404 Not Found if there are no books.
pub async fn list_all_books_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = state.book_service.list_all().await?;
    Ok(Json(books))
}

/// Searches books by any combination of predicates.
///
/// # Endpoint
///
/// `GET /books/search?title=&author=&category=&min_pages=&max_pages=&available=&skip=0&limit=10`
///
/// Text predicates are case-insensitive substring matches, page bounds are
/// inclusive, `available` is exact. Pagination applies after filtering.
///
/// # Errors
///
/// Returns 404 Not Found if nothing matches on the requested page, including
/// when `min_pages > max_pages` or `limit=0`.
/// Returns 400 Bad Request for a negative `skip` or `limit`.
pub async fn search_books_handler(
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Book>>, AppError> {
    let filter = params.to_filter();
    let (skip, limit) = params.page.resolve(DEFAULT_SEARCH_LIMIT)?;

    let books = state
        .book_service
        .list_filtered(&filter, skip, limit)
        .await?;
    Ok(Json(books))
}
