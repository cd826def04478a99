//! Database connection and repositories
//!
//! The catalog store (authors, books) and the credential store (users) live in
//! one SQLite database. Each repository is a thin, cheaply cloned handle over
//! the shared pool.

pub mod authors;
pub mod books;
pub mod schema_sync;
pub mod seed;
pub mod sqlite_helpers;
pub mod users;

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use authors::{AuthorRecord, AuthorRepository, AuthorUpsert};
pub use books::{BookRecord, BookRepository, CreateBook};
pub use users::{CreateUser, UserRecord, UsersRepository};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Get the maximum connection pool size from environment or default
    fn get_max_connections() -> u32 {
        std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10)
    }

    /// Open the pool and make sure the tables exist. Fails if the store is
    /// unreachable, so startup aborts instead of serving without a database.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid DATABASE_URL: {url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options =
            SqlitePoolOptions::new().acquire_timeout(std::time::Duration::from_secs(10));
        // Every connection to `:memory:` is its own database, so keep exactly one alive
        pool_options = if url.contains(":memory:") {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(Self::get_max_connections())
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.sync_schema().await?;
        Ok(db)
    }

    /// Fresh, empty in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn sync_schema(&self) -> Result<()> {
        let result = schema_sync::sync_schema(&self.pool)
            .await
            .context("Failed to synchronize database schema")?;
        if !result.tables_created.is_empty() {
            tracing::info!(tables = ?result.tables_created, "Database schema initialized");
        }
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get an authors repository
    pub fn authors(&self) -> AuthorRepository {
        AuthorRepository::new(self.pool.clone())
    }

    /// Get a books repository
    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.pool.clone())
    }

    /// Get a users repository
    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }
}
