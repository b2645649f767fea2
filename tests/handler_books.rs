mod common;

use axum::Router;
use axum::http::StatusCode;
use axum_test::TestServer;
use book_catalog::api::routes::book_routes;
use serde_json::{Value, json};
use sqlx::PgPool;

fn make_server(pool: PgPool) -> TestServer {
    let (state, _cache) = common::create_test_state(pool);
    let app = Router::new().merge(book_routes()).with_state(state);
    TestServer::new(app).unwrap()
}

fn body(title: &str, category: &str, pages: i32) -> Value {
    json!({
        "title": title,
        "description": "A story",
        "author": "N. K. Jemisin",
        "category": category,
        "pages": pages,
        "available": true
    })
}

// ─── POST ────────────────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_create_book(pool: PgPool) {
    let server = make_server(pool);

    let response = server.post("/books").json(&body("The Fifth Season", "Fantasy", 468)).await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert!(json["id"].as_i64().unwrap() > 0);
    assert_eq!(json["title"], "The Fifth Season");
    assert_eq!(json["pages"], 468);
}

#[sqlx::test]
async fn test_create_book_defaults(pool: PgPool) {
    let server = make_server(pool);

    let response = server
        .post("/books")
        .json(&json!({
            "title": "The Obelisk Gate",
            "author": "N. K. Jemisin",
            "category": "Fantasy",
            "pages": 410
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["description"], "");
    assert_eq!(json["available"], true);
}

#[sqlx::test]
async fn test_create_book_validation_error(pool: PgPool) {
    let server = make_server(pool);

    let response = server.post("/books").json(&body("", "Fantasy", 10)).await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");

    server
        .post("/books")
        .json(&body("Negative", "Fantasy", -5))
        .await
        .assert_status_bad_request();
}

// ─── GET /books/{id} ─────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_get_book(pool: PgPool) {
    let id = common::insert_book(&pool, "Parable of the Sower", "Fiction", 345).await;
    let server = make_server(pool);

    let response = server.get(&format!("/books/{}", id)).await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["id"], id);
    assert_eq!(json["title"], "Parable of the Sower");
}

#[sqlx::test]
async fn test_get_book_not_found(pool: PgPool) {
    let server = make_server(pool);

    let response = server.get("/books/999999").await;

    response.assert_status_not_found();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["message"], "Book not found!");
}

// ─── PUT ─────────────────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_update_book_full_replace(pool: PgPool) {
    let server = make_server(pool);
    let created = server
        .post("/books")
        .json(&body("Working Title", "Fantasy", 100))
        .await
        .json::<Value>();
    let id = created["id"].as_i64().unwrap();

    // Omitted fields fall back to defaults rather than keeping stored values.
    let response = server
        .put(&format!("/books/{}", id))
        .json(&json!({
            "title": "The Stone Sky",
            "author": "N. K. Jemisin",
            "category": "Fantasy",
            "pages": 416
        }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["id"], id);
    assert_eq!(json["title"], "The Stone Sky");
    assert_eq!(json["description"], "");

    let fetched = server.get(&format!("/books/{}", id)).await.json::<Value>();
    assert_eq!(fetched, json);
}

#[sqlx::test]
async fn test_update_book_not_found(pool: PgPool) {
    let server = make_server(pool);

    server
        .put("/books/999999")
        .json(&body("Nobody", "Fantasy", 1))
        .await
        .assert_status_not_found();
}

// ─── DELETE ──────────────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_delete_book(pool: PgPool) {
    let id = common::insert_book(&pool, "Fledgling", "Fiction", 310).await;
    let server = make_server(pool);

    // Populate the cache first so the delete has something to evict.
    server.get(&format!("/books/{}", id)).await.assert_status_ok();

    let response = server.delete(&format!("/books/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "detail": "Book deleted!" }));

    server
        .get(&format!("/books/{}", id))
        .await
        .assert_status_not_found();
    server
        .delete(&format!("/books/{}", id))
        .await
        .assert_status_not_found();
}

// ─── GET /books ──────────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_list_books_skip(pool: PgPool) {
    let ids = common::seed_books(&pool, 5).await;
    let server = make_server(pool);

    let response = server.get("/books").add_query_param("skip", 3).await;

    response.assert_status_ok();
    let books = response.json::<Vec<Value>>();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["id"], ids[3]);
    assert_eq!(books[1]["id"], ids[4]);
}

#[sqlx::test]
async fn test_list_books_limit(pool: PgPool) {
    common::seed_books(&pool, 5).await;
    let server = make_server(pool);

    let response = server.get("/books").add_query_param("limit", 2).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>().len(), 2);
}

#[sqlx::test]
async fn test_list_books_empty(pool: PgPool) {
    let server = make_server(pool);

    let response = server.get("/books").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["message"], "No book found");
}

#[sqlx::test]
async fn test_list_books_zero_limit_is_empty_page(pool: PgPool) {
    common::seed_books(&pool, 3).await;
    let server = make_server(pool);

    let response = server.get("/books").add_query_param("limit", 0).await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["message"], "No book found");
}

#[sqlx::test]
async fn test_list_books_negative_skip(pool: PgPool) {
    let server = make_server(pool);

    server
        .get("/books")
        .add_query_param("skip", -1)
        .await
        .assert_status_bad_request();
}

#[sqlx::test]
async fn test_list_all_books(pool: PgPool) {
    common::seed_books(&pool, 25).await;
    let server = make_server(pool);

    let response = server.get("/books/all").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>().len(), 25);
}

// ─── GET /books/search ───────────────────────────────────────────────────────

#[sqlx::test]
async fn test_search_by_category(pool: PgPool) {
    common::insert_book(&pool, "Hyperion", "Science Fiction", 482).await;
    common::insert_book(&pool, "Piranesi", "Fantasy", 272).await;
    let server = make_server(pool);

    let response = server
        .get("/books/search")
        .add_query_param("category", "fiction")
        .await;

    response.assert_status_ok();
    let books = response.json::<Vec<Value>>();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Hyperion");
}

#[sqlx::test]
async fn test_search_by_page_range(pool: PgPool) {
    common::insert_book(&pool, "Slim", "Fiction", 120).await;
    common::insert_book(&pool, "Thick", "Fiction", 900).await;
    let server = make_server(pool);

    let response = server
        .get("/books/search")
        .add_query_param("min_pages", 100)
        .add_query_param("max_pages", 500)
        .await;

    response.assert_status_ok();
    let books = response.json::<Vec<Value>>();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Slim");
}

#[sqlx::test]
async fn test_search_no_match(pool: PgPool) {
    common::seed_books(&pool, 3).await;
    let server = make_server(pool);

    let response = server
        .get("/books/search")
        .add_query_param("author", "Nobody In Particular")
        .await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["message"], "No book found!");
}

#[sqlx::test]
async fn test_search_inverted_page_range(pool: PgPool) {
    common::insert_book(&pool, "Middling", "Fiction", 300).await;
    let server = make_server(pool);

    let response = server
        .get("/books/search")
        .add_query_param("min_pages", 500)
        .add_query_param("max_pages", 100)
        .await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["message"], "No book found!");
}

#[sqlx::test]
async fn test_search_text_matched_as_given(pool: PgPool) {
    common::insert_book(&pool, "The Left Hand of Darkness", "Fiction", 304).await;
    common::insert_book(&pool, "Offerings", "Poetry", 80).await;
    let server = make_server(pool);

    let response = server
        .get("/books/search")
        .add_query_param("title", " of ")
        .await;

    response.assert_status_ok();
    let books = response.json::<Vec<Value>>();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "The Left Hand of Darkness");
}

#[sqlx::test]
async fn test_search_empty_text_is_ignored(pool: PgPool) {
    common::seed_books(&pool, 2).await;
    let server = make_server(pool);

    let response = server
        .get("/books/search")
        .add_query_param("title", "")
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>().len(), 2);
}
