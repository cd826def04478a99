//! GraphQL HTTP and WebSocket endpoints
//!
//! The session token is resolved to a user once per request (or once per
//! WebSocket connection) and attached to the request data as [AuthUser].
//! Missing or invalid tokens mean "no caller", never a failed request.

use async_graphql::http::GraphiQLSource;
use async_graphql::{Data, ErrorExtensions, Pos};
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::AppState;
use crate::graphql::AuthUser;
use crate::services::{AuthService, ServiceResult, extract_bearer};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/graphql/ws", get(graphql_ws_handler))
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer)
}

async fn resolve_caller(auth: &AuthService, token: Option<&str>) -> ServiceResult<Option<AuthUser>> {
    let Some(token) = token else {
        return Ok(None);
    };
    let user = auth.resolve_token(token).await?;
    if let Some(user) = &user {
        tracing::debug!(user_id = %user.id, "Request authenticated");
    }
    Ok(user.map(AuthUser))
}

async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        Html(
            GraphiQLSource::build()
                .endpoint("/graphql")
                .subscription_endpoint("/graphql/ws")
                .finish(),
        )
        .into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    match resolve_caller(&state.auth, extract_token(&headers)).await {
        Ok(Some(user)) => request = request.data(user),
        Ok(None) => {}
        Err(e) => {
            let error = e.extend().into_server_error(Pos::default());
            return async_graphql::Response::from_errors(vec![error]).into();
        }
    }
    state.schema.execute(request).await.into()
}

async fn graphql_ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> Response {
    let header_user = match resolve_caller(&state.auth, extract_token(&headers)).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve WebSocket caller");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let schema = state.schema.clone();
    let auth = state.auth.clone();

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |socket| {
            let mut ws = GraphQLWebSocket::new(socket, schema, protocol);
            if let Some(user) = header_user {
                let mut data = Data::default();
                data.insert(user);
                ws = ws.with_data(data);
            }
            ws.on_connection_init(move |params| {
                let auth = auth.clone();
                async move {
                    let mut data = Data::default();
                    let token = params
                        .get("Authorization")
                        .or_else(|| params.get("authorization"))
                        .and_then(|v| v.as_str());
                    if let Some(user) = resolve_caller(&auth, token)
                        .await
                        .map_err(|e| e.extend())?
                    {
                        data.insert(user);
                    }
                    Ok::<_, async_graphql::Error>(data)
                }
            })
            .serve()
        })
        .into_response()
}
