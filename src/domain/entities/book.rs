//! Book entity and its attribute sets.

use serde::{Deserialize, Serialize};

/// A stored book record.
///
/// `id` is assigned by the durable store on insert and never changes afterwards.
/// The serialized form doubles as the cache snapshot and the API wire format:
/// a flat object with `id, title, description, author, category, pages, available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: String,
    pub category: String,
    pub pages: i32,
    pub available: bool,
}

impl Book {
    /// Creates a new Book instance.
    pub fn new(id: i64, attributes: NewBook) -> Self {
        Self {
            id,
            title: attributes.title,
            description: attributes.description,
            author: attributes.author,
            category: attributes.category,
            pages: attributes.pages,
            available: attributes.available,
        }
    }

    /// Returns the mutable attributes of this book, without the id.
    pub fn attributes(&self) -> NewBook {
        NewBook {
            title: self.title.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            pages: self.pages,
            available: self.available,
        }
    }
}

/// Full attribute set of a book.
///
/// Used both for inserts and for updates. Updates replace every field;
/// nothing is merged from the previous record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub author: String,
    pub category: String,
    pub pages: i32,
    pub available: bool,
}

/// Conjunctive search predicates.
///
/// `None` fields are left out of the query entirely. Text predicates are
/// case-insensitive substring matches; page bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub min_pages: Option<i32>,
    pub max_pages: Option<i32>,
    pub available: Option<bool>,
}

impl BookFilter {
    /// Returns true if no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.min_pages.is_none()
            && self.max_pages.is_none()
            && self.available.is_none()
    }

    /// In-process evaluation of the predicates against a book.
    ///
    /// Mirrors the SQL built by the PostgreSQL repository, which makes it usable
    /// by alternate stores and by tests.
    pub fn matches(&self, book: &Book) -> bool {
        fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_deref()
                .is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }

        contains_ci(&book.title, &self.title)
            && contains_ci(&book.author, &self.author)
            && contains_ci(&book.category, &self.category)
            && self.min_pages.is_none_or(|min| book.pages >= min)
            && self.max_pages.is_none_or(|max| book.pages <= max)
            && self.available.is_none_or(|a| book.available == a)
    }
}
