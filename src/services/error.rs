//! Error taxonomy shared by the query, auth and mutation services.
//!
//! Resolvers turn a [ServiceError] into an `async_graphql::Error` with
//! [ErrorExtensions::extend] (not `?`, whose blanket conversion would drop the
//! extensions), which attaches a machine-readable `code` (and, for input
//! errors, the offending arguments) so clients can tell the kinds apart.

use async_graphql::ErrorExtensions;
use serde_json::Value as JsonValue;
use thiserror::Error;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Uniform message for failed logins; never reveals whether the user exists.
pub const LOGIN_FAILED_MESSAGE: &str = "incorrect username or password";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A write was attempted without a resolved caller identity.
    #[error("session error: not logged in")]
    Unauthenticated,

    #[error("{}", LOGIN_FAILED_MESSAGE)]
    AuthenticationFailed,

    /// A constraint on a write was violated (uniqueness, length, mismatch).
    #[error("{message}")]
    InvalidInput {
        message: String,
        invalid_args: JsonValue,
    },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn invalid_input(message: impl Into<String>, invalid_args: JsonValue) -> Self {
        Self::InvalidInput {
            message: message.into(),
            invalid_args,
        }
    }

    /// GraphQL extension code, following the Apollo conventions clients expect.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated | ServiceError::AuthenticationFailed => {
                "UNAUTHENTICATED"
            }
            ServiceError::InvalidInput { .. } => "BAD_USER_INPUT",
            ServiceError::Store(_) | ServiceError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// True when the store rejected a write because of a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        if matches!(self, ServiceError::Store(_) | ServiceError::Internal(_)) {
            tracing::error!(error = %self, "Request failed");
        }

        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.code());
            if let ServiceError::InvalidInput { invalid_args, .. } = self {
                if let Ok(args) = async_graphql::Value::from_json(invalid_args.clone()) {
                    e.set("invalidArgs", args);
                }
            }
        })
    }
}
