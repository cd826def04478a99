//! Client-side helpers for consumers of the catalog API

pub mod cache;

pub use cache::{
    CacheError, CacheEvent, CachedAuthor, CachedBook, CatalogCache, SharedCatalogCache,
};
