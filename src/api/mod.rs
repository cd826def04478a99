//! HTTP route definitions
//!
//! The primary API is GraphQL at /graphql, with subscriptions on /graphql/ws.
//! Health probes live next to it.

pub mod graphql;
pub mod health;
