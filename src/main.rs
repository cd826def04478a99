//! Library Catalog - GraphQL backend for books, authors and readers
//!
//! All operations are exposed via GraphQL at /graphql.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_catalog::cli::CliOptions;
use library_catalog::config::Config;
use library_catalog::db::Database;
use library_catalog::db::seed::run_seeds;
use library_catalog::{AppState, build_app};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "library_catalog=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("pretty")) {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = CliOptions::from_args();
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port_override {
        config.port = port;
    }
    let config = Arc::new(config);

    tracing::info!("Starting Library Catalog");

    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connected");

    if cli.seed || cli.seed_only {
        run_seeds(&db).await?;
        if cli.seed_only {
            return Ok(());
        }
    }

    let state = AppState::new(config.clone(), db);
    let app = build_app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
