//! Shared setup for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use async_graphql::{Request, Response, Variables};
use serde_json::Value;

use library_catalog::AppState;
use library_catalog::config::Config;
use library_catalog::db::{Database, UserRecord};
use library_catalog::graphql::AuthUser;

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-secret".to_string(),
        bcrypt_cost: 4,
        token_lifetime_secs: None,
        event_capacity: 16,
    }
}

pub async fn setup() -> AppState {
    let config = test_config();
    let db = Database::connect(&config.database_url).await.unwrap();
    AppState::new(Arc::new(config), db)
}

pub async fn execute(
    state: &AppState,
    query: &str,
    variables: Value,
    caller: Option<&UserRecord>,
) -> Response {
    let mut request = Request::new(query).variables(Variables::from_json(variables));
    if let Some(user) = caller {
        request = request.data(AuthUser(user.clone()));
    }
    state.schema.execute(request).await
}

pub fn data(response: Response) -> Value {
    assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

pub fn error_code(response: &Response) -> Option<String> {
    let extensions = response.errors.first()?.extensions.as_ref()?;
    match extensions.get("code")? {
        async_graphql::Value::String(code) => Some(code.clone()),
        _ => None,
    }
}

pub const CREATE_USER: &str = r#"
    mutation CreateUser($username: String!, $password: String!, $verify: String!, $genre: String!) {
        createUser(username: $username, password: $password, verifyPassword: $verify, favoriteGenre: $genre) {
            id
            username
            favoriteGenre
        }
    }
"#;

pub const LOGIN: &str = r#"
    mutation Login($username: String!, $password: String!) {
        login(username: $username, password: $password) { value }
    }
"#;

pub const ADD_BOOK: &str = r#"
    mutation AddBook($title: String!, $published: Int!, $author: String!, $genres: [String!]!) {
        addBook(title: $title, published: $published, author: $author, genres: $genres) {
            id
            title
            published
            genres
            author { id name born bookCount }
        }
    }
"#;

/// Register a user and log in, returning the token and the resolved user.
pub async fn register_and_login(state: &AppState, username: &str, genre: &str) -> (String, UserRecord) {
    let created = execute(
        state,
        CREATE_USER,
        serde_json::json!({
            "username": username,
            "password": "pw1234",
            "verify": "pw1234",
            "genre": genre,
        }),
        None,
    )
    .await;
    data(created);

    let login = execute(
        state,
        LOGIN,
        serde_json::json!({ "username": username, "password": "pw1234" }),
        None,
    )
    .await;
    let token = data(login)["login"]["value"].as_str().unwrap().to_string();
    let user = state.auth.resolve_token(&token).await.unwrap().unwrap();
    (token, user)
}
