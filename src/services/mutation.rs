//! Mutation layer: validated writes to the catalog and credential stores.
//!
//! Catalog writes require a resolved caller and publish change notifications
//! after the store write has committed. Registration and login are open.

use serde_json::json;
use tracing::info;

use crate::db::{AuthorRecord, BookRecord, CreateBook, CreateUser, Database, UserRecord};
use crate::services::auth::AuthService;
use crate::services::error::{ServiceError, ServiceResult, is_unique_violation};
use crate::services::events::{CatalogEvent, CatalogEvents};

const MIN_TITLE_LEN: usize = 2;
const MIN_USERNAME_LEN: usize = 4;
const MIN_FAVORITE_GENRE_LEN: usize = 3;

/// Input for [MutationService::add_book]
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub published: i32,
    pub author_name: String,
    pub genres: Vec<String>,
}

/// Input for [MutationService::register_user]
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub verify_password: String,
    pub favorite_genre: String,
}

#[derive(Clone)]
pub struct MutationService {
    db: Database,
    auth: AuthService,
    events: CatalogEvents,
}

fn require_caller(caller: Option<&UserRecord>) -> ServiceResult<&UserRecord> {
    caller.ok_or(ServiceError::Unauthenticated)
}

fn too_short(value: &str, min: usize) -> bool {
    value.chars().count() < min
}

impl MutationService {
    pub fn new(db: Database, auth: AuthService, events: CatalogEvents) -> Self {
        Self { db, auth, events }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Add a book, creating its author on first use.
    pub async fn add_book(
        &self,
        caller: Option<&UserRecord>,
        book: NewBook,
    ) -> ServiceResult<BookRecord> {
        let caller = require_caller(caller)?;

        if too_short(&book.title, MIN_TITLE_LEN) {
            return Err(ServiceError::invalid_input(
                format!("title must be at least {MIN_TITLE_LEN} characters"),
                json!({ "title": book.title }),
            ));
        }
        if book.author_name.trim().is_empty() {
            return Err(ServiceError::invalid_input(
                "author name must not be empty",
                json!({ "author": book.author_name }),
            ));
        }
        if book.genres.iter().any(|g| g.trim().is_empty()) {
            return Err(ServiceError::invalid_input(
                "genres must not be empty",
                json!({ "genres": book.genres }),
            ));
        }

        let books = self.db.books();
        if books.get_by_title(&book.title).await?.is_some() {
            return Err(title_taken(&book.title));
        }

        let title = book.title.clone();
        let (created, upsert) = books
            .create_with_author(CreateBook {
                title: book.title,
                published: book.published,
                author_name: book.author_name,
                genres: book.genres,
            })
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    title_taken(&title)
                } else {
                    ServiceError::Store(e)
                }
            })?;

        if upsert.created {
            info!(author = %upsert.author.name, by = %caller.username, "Author added");
            self.events.publish(CatalogEvent::AuthorAdded(upsert.author));
        }
        info!(title = %created.title, by = %caller.username, "Book added");
        self.events.publish(CatalogEvent::BookAdded(created.clone()));

        Ok(created)
    }

    /// Set an author's birth year, creating the author if it is unknown.
    pub async fn edit_author_birth_year(
        &self,
        caller: Option<&UserRecord>,
        name: &str,
        born: i32,
    ) -> ServiceResult<AuthorRecord> {
        let caller = require_caller(caller)?;
        if name.trim().is_empty() {
            return Err(ServiceError::invalid_input(
                "author name must not be empty",
                json!({ "name": name }),
            ));
        }

        let author = self.db.authors().upsert_born(name, born).await?;
        info!(author = %author.name, born, by = %caller.username, "Author edited");
        self.events.publish(CatalogEvent::AuthorEdited(author.clone()));
        Ok(author)
    }

    /// Create an author explicitly. Existing names are rejected.
    pub async fn add_author(
        &self,
        caller: Option<&UserRecord>,
        name: &str,
        born: Option<i32>,
    ) -> ServiceResult<AuthorRecord> {
        let caller = require_caller(caller)?;
        if name.trim().is_empty() {
            return Err(ServiceError::invalid_input(
                "author name must not be empty",
                json!({ "name": name }),
            ));
        }

        let author = self.db.authors().create(name, born).await.map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::invalid_input("author already exists", json!({ "name": name }))
            } else {
                ServiceError::Store(e)
            }
        })?;

        info!(author = %author.name, by = %caller.username, "Author added");
        self.events.publish(CatalogEvent::AuthorAdded(author.clone()));
        Ok(author)
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Register a new user. The password is only ever stored as a bcrypt hash.
    pub async fn register_user(&self, registration: Registration) -> ServiceResult<UserRecord> {
        let Registration {
            username,
            password,
            verify_password,
            favorite_genre,
        } = registration;

        if password != verify_password {
            return Err(ServiceError::invalid_input(
                "passwords do not match",
                json!({ "username": username }),
            ));
        }
        if too_short(&username, MIN_USERNAME_LEN) {
            return Err(ServiceError::invalid_input(
                format!("username must be at least {MIN_USERNAME_LEN} characters"),
                json!({ "username": username }),
            ));
        }
        if too_short(&favorite_genre, MIN_FAVORITE_GENRE_LEN) {
            return Err(ServiceError::invalid_input(
                format!("favorite genre must be at least {MIN_FAVORITE_GENRE_LEN} characters"),
                json!({ "favoriteGenre": favorite_genre }),
            ));
        }

        let users = self.db.users();
        if users.get_by_username(&username).await?.is_some() {
            return Err(username_taken(&username));
        }

        let password_hash = self.auth.hash_password(&password).await?;
        let user = users
            .create(CreateUser {
                username: username.clone(),
                favorite_genre,
                password_hash,
            })
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    username_taken(&username)
                } else {
                    ServiceError::Store(e)
                }
            })?;

        info!(username = %user.username, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<String> {
        let Some(user) = self.db.users().get_by_username(username).await? else {
            self.auth.verify_dummy_password(password).await?;
            info!(username, "Login failed");
            return Err(ServiceError::AuthenticationFailed);
        };

        if !self.auth.verify_password(password, &user.password_hash).await? {
            info!(username, "Login failed");
            return Err(ServiceError::AuthenticationFailed);
        }

        info!(username, "User logged in");
        self.auth.issue_token(&user)
    }
}

fn title_taken(title: &str) -> ServiceError {
    ServiceError::invalid_input("title must be unique", json!({ "title": title }))
}

fn username_taken(username: &str) -> ServiceError {
    ServiceError::invalid_input("username must be unique", json!({ "username": username }))
}
