//! Integration tests for the HTTP surface: health probes, the GraphQL
//! endpoint and bearer token handling.

mod common;

use axum::body::{Body, to_bytes};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::*;
use library_catalog::{AppState, build_app};

async fn post_graphql(state: &AppState, query: &str, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::post("/graphql").header(CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        request = request.header(AUTHORIZATION, value);
    }
    let request = request
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap();

    let response = build_app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_probes() {
    let state = setup().await;

    let response = build_app(state.clone())
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_app(state)
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["ready"], true);
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_bearer_token_identifies_caller() {
    let state = setup().await;
    let (token, _) = register_and_login(&state, "alice", "fiction").await;

    let (status, body) = post_graphql(&state, "{ me { username } }", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "me": { "username": "alice" } }));

    // the scheme is matched case-insensitively
    let jwt = token.trim_start_matches("Bearer ");
    let lower = format!("bearer {jwt}");
    let (_, body) = post_graphql(&state, "{ me { username } }", Some(&lower)).await;
    assert_eq!(body["data"], json!({ "me": { "username": "alice" } }));
}

#[tokio::test]
async fn test_bad_tokens_mean_no_caller() {
    let state = setup().await;

    for header in [None, Some("Bearer garbage"), Some("Basic YWxpY2U6cHc=")] {
        let (status, body) = post_graphql(&state, "{ me { username } }", header).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "me": null }));
        assert!(body.get("errors").is_none());
    }
}

#[tokio::test]
async fn test_add_book_over_http() {
    let state = setup().await;
    let (token, _) = register_and_login(&state, "alice", "fiction").await;
    let mutation = r#"mutation { addBook(title: "Dune", published: 1965, author: "Frank Herbert", genres: ["fiction"]) { title author { name } } }"#;

    let (_, body) = post_graphql(&state, mutation, None).await;
    assert_eq!(body["data"]["addBook"], Value::Null);
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");

    let (_, body) = post_graphql(&state, mutation, Some(&token)).await;
    assert_eq!(
        body["data"]["addBook"],
        json!({ "title": "Dune", "author": { "name": "Frank Herbert" } })
    );
}

#[tokio::test]
async fn test_get_graphql_serves_playground_to_browsers_only() {
    let state = setup().await;

    let response = build_app(state.clone())
        .oneshot(
            Request::get("/graphql")
                .header(ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_app(state)
        .oneshot(Request::get("/graphql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
