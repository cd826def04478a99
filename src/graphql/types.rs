//! GraphQL object types for the catalog
//!
//! Stored fields come straight from the records; computed fields
//! (`bookCount`, `author`, `favoriteGenreBooks`, ...) ask the query service.

use anyhow::anyhow;
use async_graphql::{ComplexObject, Context, ErrorExtensions, ID, Result, SimpleObject};

use crate::db::{AuthorRecord, BookRecord, UserRecord};
use crate::services::{QueryService, ServiceError};

use super::helpers::ServiceResultExt;

// ============================================================================
// Author
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Author {
    pub id: ID,
    pub name: String,
    pub born: Option<i32>,
}

#[ComplexObject]
impl Author {
    /// Number of books by this author
    async fn book_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<QueryService>()?
            .book_count_for_author(&self.id)
            .await
            .extend_err()
    }
}

impl From<AuthorRecord> for Author {
    fn from(r: AuthorRecord) -> Self {
        Self {
            id: ID(r.id),
            name: r.name,
            born: r.born,
        }
    }
}

// ============================================================================
// Book
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Book {
    pub id: ID,
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    #[graphql(skip)]
    pub author_id: String,
}

#[ComplexObject]
impl Book {
    async fn author(&self, ctx: &Context<'_>) -> Result<Author> {
        let author = ctx
            .data::<QueryService>()?
            .author_by_id(&self.author_id)
            .await
            .extend_err()?;

        author.map(Author::from).ok_or_else(|| {
            ServiceError::Internal(anyhow!(
                "book {} references missing author {}",
                self.id.as_str(),
                self.author_id
            ))
            .extend()
        })
    }
}

impl From<BookRecord> for Book {
    fn from(r: BookRecord) -> Self {
        Self {
            id: ID(r.id),
            title: r.title,
            published: r.published,
            genres: r.genres,
            author_id: r.author_id,
        }
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct User {
    pub id: ID,
    pub username: String,
    pub favorite_genre: String,
}

#[ComplexObject]
impl User {
    /// Books in the user's favorite genre
    async fn favorite_genre_books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let books = ctx
            .data::<QueryService>()?
            .books_for_genre(&self.favorite_genre)
            .await
            .extend_err()?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn favorite_genre_book_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<QueryService>()?
            .genre_book_count(&self.favorite_genre)
            .await
            .extend_err()
    }
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: ID(r.id),
            username: r.username,
            favorite_genre: r.favorite_genre,
        }
    }
}

// ============================================================================
// Token
// ============================================================================

/// Session token returned by `login`, in the form `"Bearer <jwt>"`
#[derive(Debug, Clone, SimpleObject)]
pub struct Token {
    pub value: String,
}
