//! GraphQL API with subscriptions for real-time updates
//!
//! Queries and mutations are split per domain under `queries/` and
//! `mutations/` and merged into the roots in `schema.rs`. Services are shared
//! through the schema data; the caller identity is attached per request as
//! [AuthUser].

pub mod auth;
pub mod helpers;
pub mod mutations;
pub mod queries;
mod schema;
mod subscriptions;
pub mod types;

pub use auth::{AuthExt, AuthUser};
pub use schema::{CatalogSchema, MutationRoot, QueryRoot, build_schema};
pub use subscriptions::SubscriptionRoot;
pub use types::{Author, Book, Token, User};
