//! Query layer: read-only lookups over the catalog and credential stores.
//!
//! Every lookup tolerates zero matches and returns an empty list rather than
//! an error. Computed read-model fields (an author's book count, a user's
//! favorite-genre books) are plain methods here so resolvers stay thin.

use crate::db::{AuthorRecord, BookRecord, Database, UserRecord};
use crate::services::error::ServiceResult;

/// Filter for [QueryService::list_books]. When both keys are set the author
/// filter wins.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub author_name: Option<String>,
    pub genre: Option<String>,
}

/// Filter for [QueryService::list_authors]. Precedence: book title, then birth
/// year, then name substring.
#[derive(Debug, Clone, Default)]
pub struct AuthorFilter {
    pub name_contains: Option<String>,
    pub born: Option<i32>,
    pub book_title: Option<String>,
}

/// Filter for [QueryService::list_users]. Username wins over favorite genre.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub username: Option<String>,
    pub favorite_genre: Option<String>,
}

#[derive(Clone)]
pub struct QueryService {
    db: Database,
}

impl QueryService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ========================================================================
    // Books
    // ========================================================================

    pub async fn list_books(&self, filter: &BookFilter) -> ServiceResult<Vec<BookRecord>> {
        let books = self.db.books();
        let result = if let Some(author) = &filter.author_name {
            books.list_by_author_name(author).await?
        } else if let Some(genre) = &filter.genre {
            books.list_by_genre(genre).await?
        } else {
            books.list_all().await?
        };
        Ok(result)
    }

    pub async fn books_for_genre(&self, genre: &str) -> ServiceResult<Vec<BookRecord>> {
        Ok(self.db.books().list_by_genre(genre).await?)
    }

    pub async fn genre_book_count(&self, genre: &str) -> ServiceResult<i64> {
        Ok(self.db.books().count_by_genre(genre).await?)
    }

    pub async fn count_books(&self) -> ServiceResult<i64> {
        Ok(self.db.books().count().await?)
    }

    /// Every genre across all books, each once
    pub async fn distinct_genres(&self) -> ServiceResult<Vec<String>> {
        Ok(self.db.books().distinct_genres().await?)
    }

    // ========================================================================
    // Authors
    // ========================================================================

    pub async fn list_authors(&self, filter: &AuthorFilter) -> ServiceResult<Vec<AuthorRecord>> {
        let authors = self.db.authors();

        if let Some(title) = &filter.book_title {
            let Some(book) = self.db.books().get_by_title(title).await? else {
                return Ok(Vec::new());
            };
            return Ok(authors.get_by_id(&book.author_id).await?.into_iter().collect());
        }

        let result = if let Some(born) = filter.born {
            authors.list_by_born(born).await?
        } else if let Some(fragment) = &filter.name_contains {
            authors.list_name_contains(fragment).await?
        } else {
            authors.list_all().await?
        };
        Ok(result)
    }

    pub async fn author_by_id(&self, id: &str) -> ServiceResult<Option<AuthorRecord>> {
        Ok(self.db.authors().get_by_id(id).await?)
    }

    pub async fn count_authors(&self) -> ServiceResult<i64> {
        Ok(self.db.authors().count().await?)
    }

    /// Number of books referencing the author
    pub async fn book_count_for_author(&self, author_id: &str) -> ServiceResult<i64> {
        Ok(self.db.books().count_by_author(author_id).await?)
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn list_users(&self, filter: &UserFilter) -> ServiceResult<Vec<UserRecord>> {
        let users = self.db.users();
        let result = if let Some(username) = &filter.username {
            users.get_by_username(username).await?.into_iter().collect()
        } else if let Some(genre) = &filter.favorite_genre {
            users.list_by_favorite_genre(genre).await?
        } else {
            users.list_all().await?
        };
        Ok(result)
    }

    pub async fn user_by_id(&self, id: &str) -> ServiceResult<Option<UserRecord>> {
        Ok(self.db.users().get_by_id(id).await?)
    }

    pub async fn count_users(&self) -> ServiceResult<i64> {
        Ok(self.db.users().count().await?)
    }

    /// Books in the user's favorite genre (recommendations)
    pub async fn favorite_genre_books(&self, user: &UserRecord) -> ServiceResult<Vec<BookRecord>> {
        self.books_for_genre(&user.favorite_genre).await
    }

    pub async fn favorite_genre_book_count(&self, user: &UserRecord) -> ServiceResult<i64> {
        self.genre_book_count(&user.favorite_genre).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::CreateUser;
    use crate::db::seed::run_seeds;

    async fn seeded() -> QueryService {
        let db = Database::in_memory().await.unwrap();
        run_seeds(&db).await.unwrap();
        QueryService::new(db)
    }

    fn titles(books: Vec<BookRecord>) -> Vec<String> {
        books.into_iter().map(|b| b.title).collect()
    }

    fn names(authors: Vec<AuthorRecord>) -> Vec<String> {
        authors.into_iter().map(|a| a.name).collect()
    }

    #[tokio::test]
    async fn test_list_books_filters() {
        let query = seeded().await;

        let all = query.list_books(&BookFilter::default()).await.unwrap();
        assert_eq!(all.len(), 7);

        let by_author = query
            .list_books(&BookFilter {
                author_name: Some("Fyodor Dostoevsky".to_string()),
                genre: None,
            })
            .await
            .unwrap();
        assert_eq!(titles(by_author), vec!["Crime and punishment", "The Demon"]);

        let by_genre = query
            .list_books(&BookFilter {
                author_name: None,
                genre: Some("patterns".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(
            titles(by_genre),
            vec!["Agile software development", "Refactoring to patterns"]
        );
    }

    #[tokio::test]
    async fn test_author_filter_takes_precedence_over_genre() {
        let query = seeded().await;
        let books = query
            .list_books(&BookFilter {
                author_name: Some("Martin Fowler".to_string()),
                genre: Some("classic".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(titles(books), vec!["Refactoring, edition 2"]);
    }

    #[tokio::test]
    async fn test_list_books_is_stable() {
        let query = seeded().await;
        let first = query.list_books(&BookFilter::default()).await.unwrap();
        let second = query.list_books(&BookFilter::default()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_filters_return_empty() {
        let query = seeded().await;
        let none = query
            .list_books(&BookFilter {
                author_name: Some("Nobody".to_string()),
                genre: None,
            })
            .await
            .unwrap();
        assert!(none.is_empty());

        let none = query
            .list_authors(&AuthorFilter {
                book_title: Some("No Such Book".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_authors_filters() {
        let query = seeded().await;

        let by_title = query
            .list_authors(&AuthorFilter {
                book_title: Some("Clean Code".to_string()),
                born: Some(1821),
                name_contains: None,
            })
            .await
            .unwrap();
        assert_eq!(names(by_title), vec!["Robert Martin"]);

        let by_born = query
            .list_authors(&AuthorFilter {
                born: Some(1821),
                name_contains: Some("Martin".to_string()),
                book_title: None,
            })
            .await
            .unwrap();
        assert_eq!(names(by_born), vec!["Fyodor Dostoevsky"]);

        let by_name = query
            .list_authors(&AuthorFilter {
                name_contains: Some("Martin".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(by_name), vec!["Robert Martin", "Martin Fowler"]);

        assert_eq!(query.list_authors(&AuthorFilter::default()).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_counts_and_genres() {
        let query = seeded().await;
        assert_eq!(query.count_books().await.unwrap(), 7);
        assert_eq!(query.count_authors().await.unwrap(), 5);
        assert_eq!(query.count_users().await.unwrap(), 0);
        assert_eq!(query.genre_book_count("refactoring").await.unwrap(), 4);

        let genres = query.distinct_genres().await.unwrap();
        assert_eq!(
            genres,
            vec!["agile", "classic", "crime", "design", "patterns", "refactoring", "revolution"]
        );

        let martin = query
            .list_authors(&AuthorFilter {
                name_contains: Some("Robert".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .remove(0);
        assert_eq!(query.book_count_for_author(&martin.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_users_and_recommendations() {
        let query = seeded().await;
        let user = query
            .db
            .users()
            .create(CreateUser {
                username: "reader".to_string(),
                favorite_genre: "classic".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        let by_name = query
            .list_users(&UserFilter {
                username: Some("reader".to_string()),
                favorite_genre: None,
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);

        let by_genre = query
            .list_users(&UserFilter {
                username: None,
                favorite_genre: Some("crime".to_string()),
            })
            .await
            .unwrap();
        assert!(by_genre.is_empty());

        let recommended = query.favorite_genre_books(&user).await.unwrap();
        assert_eq!(titles(recommended), vec!["Crime and punishment", "The Demon"]);
        assert_eq!(query.favorite_genre_book_count(&user).await.unwrap(), 2);
    }
}
