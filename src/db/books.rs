//! Books repository
//!
//! Genres are stored as a JSON array in `books.genres` and queried through
//! SQLite's `json_each`, which compares values case-sensitively.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::authors::{AuthorUpsert, find_or_create_in};
use super::sqlite_helpers::{json_to_vec, new_id, now_iso8601, vec_to_json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub published: i32,
    pub author_id: String,
    pub genres: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub published: i32,
    pub author_name: String,
    pub genres: Vec<String>,
}

type BookRow = (String, String, i32, String, String, String);

const BOOK_COLUMNS: &str = "books.id, books.title, books.published, books.author_id, books.genres, books.created_at";

fn row_to_record(r: BookRow) -> BookRecord {
    BookRecord {
        id: r.0,
        title: r.1,
        published: r.2,
        author_id: r.3,
        genres: json_to_vec(&r.4),
        created_at: r.5,
    }
}

pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a book, reusing the author with `author_name` or creating it.
    ///
    /// Both writes share one transaction: if the book insert fails (for
    /// example a duplicate title) no new author is left behind.
    pub async fn create_with_author(
        &self,
        book: CreateBook,
    ) -> Result<(BookRecord, AuthorUpsert), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let upsert = find_or_create_in(&mut *tx, &book.author_name).await?;

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (id, title, published, author_id, genres, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, title, published, author_id, genres, created_at
            "#,
        )
        .bind(new_id())
        .bind(&book.title)
        .bind(book.published)
        .bind(&upsert.author.id)
        .bind(vec_to_json(&book.genres))
        .bind(now_iso8601())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((row_to_record(row), upsert))
    }

    /// Get book by exact title
    pub async fn get_by_title(&self, title: &str) -> Result<Option<BookRecord>, sqlx::Error> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE title = ?"
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_record))
    }

    /// List all books in insertion order
    pub async fn list_all(&self) -> Result<Vec<BookRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY books.rowid"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Books whose author has exactly this name
    pub async fn list_by_author_name(&self, name: &str) -> Result<Vec<BookRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             JOIN authors ON authors.id = books.author_id \
             WHERE authors.name = ? ORDER BY books.rowid"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Books whose genre list contains `genre`
    pub async fn list_by_genre(&self, genre: &str) -> Result<Vec<BookRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE EXISTS (SELECT 1 FROM json_each(books.genres) WHERE json_each.value = ?) \
             ORDER BY books.rowid"
        ))
        .bind(genre)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Count books
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Count books referencing an author
    pub async fn count_by_author(&self, author_id: &str) -> Result<i64, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM books WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Count books tagged with `genre`
    pub async fn count_by_genre(&self, genre: &str) -> Result<i64, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM books \
             WHERE EXISTS (SELECT 1 FROM json_each(books.genres) WHERE json_each.value = ?)",
        )
        .bind(genre)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    /// Every genre used by any book, once each, sorted
    pub async fn distinct_genres(&self) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT DISTINCT json_each.value FROM books, json_each(books.genres) ORDER BY 1",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
