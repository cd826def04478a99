//! Caller identity inside GraphQL resolvers
//!
//! The HTTP and WebSocket handlers resolve the session token once and attach
//! the result as [AuthUser] to the request data. Resolvers never see the token.

use async_graphql::Context;

use crate::db::UserRecord;

/// The user a request is acting as
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserRecord);

/// Extension trait to get the authenticated user from GraphQL context
pub trait AuthExt {
    /// Get the authenticated user if present. Services decide whether a
    /// missing caller is an error.
    fn try_auth_user(&self) -> Option<&UserRecord>;
}

impl<'a> AuthExt for Context<'a> {
    fn try_auth_user(&self) -> Option<&UserRecord> {
        self.data_opt::<AuthUser>().map(|user| &user.0)
    }
}
