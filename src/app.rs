//! Application state and HTTP router construction.
//!
//! Used by `main` and by the integration tests to build the Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::db::Database;
use crate::graphql::{CatalogSchema, build_schema};
use crate::services::{AuthConfig, AuthService, CatalogEvents, MutationService, QueryService};

/// Shared state for HTTP handlers (GraphQL, health probes).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: CatalogSchema,
    pub auth: AuthService,
    pub events: CatalogEvents,
}

impl AppState {
    /// Wire the services over an open database. The event bus is created here
    /// and shared by the mutation service and the subscriptions.
    pub fn new(config: Arc<Config>, db: Database) -> Self {
        let query = QueryService::new(db.clone());
        let auth = AuthService::new(query.clone(), AuthConfig::from_config(&config));
        let events = CatalogEvents::new(config.event_capacity);
        let mutations = MutationService::new(db.clone(), auth.clone(), events.clone());
        let schema = build_schema(query, mutations, auth.clone(), events.clone());

        Self {
            config,
            db,
            schema,
            auth,
            events,
        }
    }
}

/// Build the full Axum router: /graphql, /graphql/ws, health probes and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(api::health::router())
        .merge(api::graphql::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
