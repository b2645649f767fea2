//! PostgreSQL implementation of book repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{Book, BookFilter, NewBook};
use crate::domain::repositories::BookRepository;
use crate::error::AppError;

const BOOK_COLUMNS: &str = "id, title, description, author, category, pages, available";

#[derive(FromRow)]
struct BookRow {
    id: i64,
    title: String,
    description: String,
    author: String,
    category: String,
    pages: i32,
    available: bool,
}

impl From<BookRow> for Book {
    fn from(r: BookRow) -> Self {
        Book {
            id: r.id,
            title: r.title,
            description: r.description,
            author: r.author,
            category: r.category,
            pages: r.pages,
            available: r.available,
        }
    }
}

/// Escapes `ILIKE` metacharacters so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// PostgreSQL repository for book storage and retrieval.
///
/// All statements are parameterized; filter values are bound, never interpolated.
pub struct PgBookRepository {
    pool: Arc<PgPool>,
}

impl PgBookRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Appends a `WHERE` clause joining every set predicate with `AND`.
    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
        if filter.is_empty() {
            return;
        }

        builder.push(" WHERE ");
        let mut clauses = builder.separated(" AND ");

        for (column, value) in [
            ("title", &filter.title),
            ("author", &filter.author),
            ("category", &filter.category),
        ] {
            if let Some(value) = value {
                clauses
                    .push(format!("{column} ILIKE "))
                    .push_bind_unseparated(like_pattern(value));
            }
        }

        if let Some(min) = filter.min_pages {
            clauses.push("pages >= ").push_bind_unseparated(min);
        }

        if let Some(max) = filter.max_pages {
            clauses.push("pages <= ").push_bind_unseparated(max);
        }

        if let Some(available) = filter.available {
            clauses.push("available = ").push_bind_unseparated(available);
        }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn create(&self, new_book: NewBook) -> Result<Book, AppError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            INSERT INTO books (title, description, author, category, pages, available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(new_book.title)
        .bind(new_book.description)
        .bind(new_book.author)
        .bind(new_book.category)
        .bind(new_book.pages)
        .bind(new_book.available)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, AppError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Book::from))
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Book>, AppError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Book>, AppError> {
        let rows =
            sqlx::query_as::<_, BookRow>(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn search(
        &self,
        filter: &BookFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Book>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {BOOK_COLUMNS} FROM books"));
        Self::push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(skip);

        let rows = builder
            .build_query_as::<BookRow>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn update(&self, id: i64, attributes: NewBook) -> Result<Option<Book>, AppError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books
            SET title = $2, description = $3, author = $4, category = $5, pages = $6, available = $7
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(attributes.title)
        .bind(attributes.description)
        .bind(attributes.author)
        .bind(attributes.category)
        .bind(attributes.pages)
        .bind(attributes.available)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Book::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
