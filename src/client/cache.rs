//! Local copy of the `allBooks` / `allAuthors` result sets, kept current from
//! pushed change notifications so a client never has to refetch the lists.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Author as selected by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAuthor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub born: Option<i32>,
    #[serde(default)]
    pub book_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedBook {
    pub id: String,
    pub title: String,
    pub published: i32,
    pub author: CachedAuthor,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// A pushed change notification, as delivered by the subscriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    AuthorAdded(CachedAuthor),
    AuthorEdited(CachedAuthor),
    BookAdded(CachedBook),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("subscription payload has no known field")]
    UnknownPayload,

    #[error("malformed subscription payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CacheEvent {
    /// Decode the `data` object of a subscription response, e.g.
    /// `{"bookAdded": {...}}`.
    pub fn from_payload(data: JsonValue) -> Result<Self, CacheError> {
        let JsonValue::Object(mut fields) = data else {
            return Err(CacheError::UnknownPayload);
        };
        if let Some(book) = fields.remove("bookAdded") {
            return Ok(Self::BookAdded(serde_json::from_value(book)?));
        }
        if let Some(author) = fields.remove("authorAdded") {
            return Ok(Self::AuthorAdded(serde_json::from_value(author)?));
        }
        if let Some(author) = fields.remove("authorEdited") {
            return Ok(Self::AuthorEdited(serde_json::from_value(author)?));
        }
        Err(CacheError::UnknownPayload)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    books: Vec<CachedBook>,
    authors: Vec<CachedAuthor>,
}

impl CatalogCache {
    /// Seed the cache from the initial `allBooks` and `allAuthors` results.
    pub fn new(books: Vec<CachedBook>, authors: Vec<CachedAuthor>) -> Self {
        Self { books, authors }
    }

    /// Add a book unless one with the same id is cached. The embedded author
    /// is added too if it is new. Returns whether the book set changed.
    pub fn merge_book(&mut self, book: CachedBook) -> bool {
        if self.books.iter().any(|b| b.id == book.id) {
            return false;
        }

        match self.authors.iter_mut().find(|a| a.id == book.author.id) {
            Some(existing) => {
                existing.book_count = book
                    .author
                    .book_count
                    .or(existing.book_count.map(|n| n + 1));
            }
            None => self.authors.push(book.author.clone()),
        }

        self.books.push(book);
        true
    }

    /// Replace the cached author with the same id, or append it. A payload
    /// without a book count keeps the count already cached. Returns whether
    /// anything changed.
    pub fn merge_author(&mut self, mut author: CachedAuthor) -> bool {
        let Some(existing) = self.authors.iter_mut().find(|a| a.id == author.id) else {
            self.authors.push(author);
            return true;
        };
        if author.book_count.is_none() {
            author.book_count = existing.book_count;
        }
        if *existing == author {
            return false;
        }
        *existing = author;
        true
    }

    /// Fold a change notification into the cache and return the notice to
    /// show the user.
    pub fn apply(&mut self, event: CacheEvent) -> String {
        match event {
            CacheEvent::BookAdded(book) => {
                let notice = format!("{} added", book.title);
                self.merge_book(book);
                notice
            }
            CacheEvent::AuthorAdded(author) => {
                let notice = format!("{} added", author.name);
                self.merge_author(author);
                notice
            }
            CacheEvent::AuthorEdited(author) => {
                let notice = format!("{} edited", author.name);
                self.merge_author(author);
                notice
            }
        }
    }

    pub fn books(&self) -> &[CachedBook] {
        &self.books
    }

    pub fn authors(&self) -> &[CachedAuthor] {
        &self.authors
    }

    /// Cached books tagged with `genre`, in cache order
    pub fn books_in_genre<'a>(&'a self, genre: &'a str) -> impl Iterator<Item = &'a CachedBook> + 'a {
        self.books
            .iter()
            .filter(move |b| b.genres.iter().any(|g| g == genre))
    }
}

/// A cache shared between the view and the subscription listener.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalogCache {
    inner: Arc<RwLock<CatalogCache>>,
}

impl SharedCatalogCache {
    pub fn new(cache: CatalogCache) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    pub fn apply(&self, event: CacheEvent) -> String {
        self.inner.write().apply(event)
    }

    /// Copy of the current cache contents
    pub fn snapshot(&self) -> CatalogCache {
        self.inner.read().clone()
    }
}
