//! Library catalog backend
//!
//! Books, authors and users behind a GraphQL API, with live change
//! notifications over WebSocket subscriptions.

pub mod api;
pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod graphql;
pub mod services;

pub use app::{AppState, build_app};
