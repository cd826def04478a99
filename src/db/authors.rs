//! Authors repository
//!
//! Author names are unique. Every write that starts from a name goes through
//! `INSERT .. ON CONFLICT(name)` so two concurrent writers can never produce
//! two authors with the same name.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::sqlite_helpers::{new_id, now_iso8601};

const AUTHOR_COLUMNS: &str = "id, name, born, created_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuthorRecord {
    pub id: String,
    pub name: String,
    pub born: Option<i32>,
    pub created_at: String,
}

/// Outcome of a find-or-create by name.
#[derive(Debug, Clone)]
pub struct AuthorUpsert {
    pub author: AuthorRecord,
    /// True when this call inserted the author.
    pub created: bool,
}

/// Find the author called `name` or create it, on an existing connection so it
/// can share a transaction with the write that needs the author.
pub(crate) async fn find_or_create_in(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<AuthorUpsert, sqlx::Error> {
    let inserted = sqlx::query_as::<_, AuthorRecord>(&format!(
        "INSERT INTO authors (id, name, born, created_at) VALUES (?, ?, NULL, ?) \
         ON CONFLICT(name) DO NOTHING RETURNING {AUTHOR_COLUMNS}"
    ))
    .bind(new_id())
    .bind(name)
    .bind(now_iso8601())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(author) = inserted {
        return Ok(AuthorUpsert {
            author,
            created: true,
        });
    }

    let author = sqlx::query_as::<_, AuthorRecord>(&format!(
        "SELECT {AUTHOR_COLUMNS} FROM authors WHERE name = ?"
    ))
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(AuthorUpsert {
        author,
        created: false,
    })
}

pub struct AuthorRepository {
    pool: SqlitePool,
}

impl AuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new author. Fails with a unique violation if the name exists.
    pub async fn create(&self, name: &str, born: Option<i32>) -> Result<AuthorRecord, sqlx::Error> {
        sqlx::query_as::<_, AuthorRecord>(&format!(
            "INSERT INTO authors (id, name, born, created_at) VALUES (?, ?, ?, ?) \
             RETURNING {AUTHOR_COLUMNS}"
        ))
        .bind(new_id())
        .bind(name)
        .bind(born)
        .bind(now_iso8601())
        .fetch_one(&self.pool)
        .await
    }

    /// Set the birth year of the author called `name`, creating the author if
    /// it does not exist yet.
    pub async fn upsert_born(&self, name: &str, born: i32) -> Result<AuthorRecord, sqlx::Error> {
        sqlx::query_as::<_, AuthorRecord>(&format!(
            "INSERT INTO authors (id, name, born, created_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(name) DO UPDATE SET born = excluded.born \
             RETURNING {AUTHOR_COLUMNS}"
        ))
        .bind(new_id())
        .bind(name)
        .bind(born)
        .bind(now_iso8601())
        .fetch_one(&self.pool)
        .await
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<AuthorRecord>, sqlx::Error> {
        sqlx::query_as::<_, AuthorRecord>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Get author by exact name
    pub async fn get_by_name(&self, name: &str) -> Result<Option<AuthorRecord>, sqlx::Error> {
        sqlx::query_as::<_, AuthorRecord>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE name = ?"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    /// List all authors in insertion order
    pub async fn list_all(&self) -> Result<Vec<AuthorRecord>, sqlx::Error> {
        sqlx::query_as::<_, AuthorRecord>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Authors born in exactly `born`
    pub async fn list_by_born(&self, born: i32) -> Result<Vec<AuthorRecord>, sqlx::Error> {
        sqlx::query_as::<_, AuthorRecord>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE born = ? ORDER BY rowid"
        ))
        .bind(born)
        .fetch_all(&self.pool)
        .await
    }

    /// Authors whose name contains `fragment`. `instr` keeps the match
    /// case-sensitive, unlike `LIKE`.
    pub async fn list_name_contains(&self, fragment: &str) -> Result<Vec<AuthorRecord>, sqlx::Error> {
        sqlx::query_as::<_, AuthorRecord>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE instr(name, ?) > 0 ORDER BY rowid"
        ))
        .bind(fragment)
        .fetch_all(&self.pool)
        .await
    }

    /// Count authors
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::find_or_create_in;
    use crate::db::Database;

    #[tokio::test]
    async fn test_find_or_create_reuses_existing() {
        let db = Database::in_memory().await.unwrap();
        let authors = db.authors();
        let mut conn = db.pool().acquire().await.unwrap();

        let first = find_or_create_in(&mut *conn, "Sandi Metz").await.unwrap();
        assert!(first.created);
        assert_eq!(first.author.born, None);

        let second = find_or_create_in(&mut *conn, "Sandi Metz").await.unwrap();
        assert!(!second.created);
        assert_eq!(second.author.id, first.author.id);
        drop(conn);
        assert_eq!(authors.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_born_creates_then_updates() {
        let db = Database::in_memory().await.unwrap();
        let authors = db.authors();

        let created = authors.upsert_born("Martin Fowler", 1963).await.unwrap();
        assert_eq!(created.born, Some(1963));

        let updated = authors.upsert_born("Martin Fowler", 1964).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.born, Some(1964));
        assert_eq!(authors.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let db = Database::in_memory().await.unwrap();
        let authors = db.authors();

        authors.create("Robert Martin", Some(1952)).await.unwrap();
        let err = authors.create("Robert Martin", None).await.unwrap_err();
        assert!(crate::services::error::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_name_filter_is_case_sensitive_substring() {
        let db = Database::in_memory().await.unwrap();
        let authors = db.authors();
        authors.create("Robert Martin", None).await.unwrap();
        authors.create("Martin Fowler", None).await.unwrap();
        authors.create("Sandi Metz", None).await.unwrap();

        let names: Vec<String> = authors
            .list_name_contains("Martin")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Robert Martin", "Martin Fowler"]);

        assert!(authors.list_name_contains("martin").await.unwrap().is_empty());
    }
}
