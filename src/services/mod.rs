//! Catalog services: reads, validated writes, authentication and change events

pub mod auth;
pub mod error;
pub mod events;
pub mod mutation;
pub mod query;

pub use auth::{AuthConfig, AuthService, SessionClaims, extract_bearer};
pub use error::{ServiceError, ServiceResult};
pub use events::{CatalogEvent, CatalogEvents};
pub use mutation::{MutationService, NewBook, Registration};
pub use query::{AuthorFilter, BookFilter, QueryService, UserFilter};
