//! Authentication service for password hashing and session tokens
//!
//! Provides:
//! - Password hashing with bcrypt (run on the blocking pool)
//! - JWT session token issuing and resolution
//! - Bearer header parsing
//!
//! Tokens are stateless: there is no revocation list, a token is valid as long
//! as its signature checks out and (when a lifetime is configured) it has not
//! expired.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::db::UserRecord;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::query::QueryService;

/// Work factor used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Work factors bcrypt accepts.
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Password behind the throwaway hash checked when a login names no user.
const DUMMY_PASSWORD: &str = "not-a-real-password";

const BEARER_PREFIX: &str = "bearer ";

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID (subject)
    pub sub: String,
    pub username: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp, absent for non-expiring tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in seconds; `None` issues tokens without expiry
    pub token_lifetime: Option<i64>,
    /// Bcrypt cost factor (default: 10)
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_lifetime: config.token_lifetime_secs,
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

// ============================================================================
// Auth Service
// ============================================================================

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    query: QueryService,
    config: AuthConfig,
    /// Hash at the configured cost, built on first use
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(query: QueryService, config: AuthConfig) -> Self {
        Self {
            query,
            config,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    // ========================================================================
    // Passwords
    // ========================================================================

    /// Hash a password with bcrypt. CPU-bound, so it runs on the blocking pool
    /// and leaves the async workers free for other requests.
    pub async fn hash_password(&self, password: &str) -> ServiceResult<String> {
        let password = password.to_string();
        let cost = self.config.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| anyhow!("Password hashing task failed: {}", e))?
            .map_err(|e| ServiceError::Internal(anyhow!("Failed to hash password: {}", e)))
    }

    /// Verify a password against a stored hash
    pub async fn verify_password(&self, password: &str, hash: &str) -> ServiceResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| anyhow!("Password verification task failed: {}", e))?
            .map_err(|e| ServiceError::Internal(anyhow!("Failed to verify password: {}", e)))
    }

    /// Run a full bcrypt verification against a throwaway hash. Logins for
    /// unknown users call this so they take as long as a wrong password.
    pub async fn verify_dummy_password(&self, password: &str) -> ServiceResult<()> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
            .await?;
        self.verify_password(password, hash).await?;
        Ok(())
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Sign a session token for `user`, returned as `"Bearer <jwt>"`.
    pub fn issue_token(&self, user: &UserRecord) -> ServiceResult<String> {
        let now = Utc::now();
        let exp = match self.config.token_lifetime {
            Some(secs) => Some(
                TimeDelta::try_seconds(secs)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .ok_or_else(|| anyhow!("Token lifetime of {}s is out of range", secs))?
                    .timestamp(),
            ),
            None => None,
        };
        let claims = SessionClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| anyhow!("Failed to create session token: {}", e))?;

        Ok(format!("Bearer {token}"))
    }

    /// Decode and validate a bare JWT
    fn decode_token(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        // `exp` is only present when a lifetime is configured
        validation.required_spec_claims.clear();

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }

    /// Resolve a session token (bare or `Bearer `-prefixed) to the current
    /// user. Invalid, malformed or expired tokens, and tokens whose user no
    /// longer exists, resolve to `None`. Only store failures are errors.
    pub async fn resolve_token(&self, token: &str) -> ServiceResult<Option<UserRecord>> {
        let token = extract_bearer(token).unwrap_or(token).trim();
        if token.is_empty() {
            return Ok(None);
        }

        let claims = match self.decode_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                return Ok(None);
            }
        };

        let user = self.query.user_by_id(&claims.sub).await?;
        if user.is_none() {
            tracing::debug!(user_id = %claims.sub, "Session token refers to unknown user");
        }
        Ok(user)
    }
}

#[cfg(test)]
impl AuthService {
    pub(crate) fn has_dummy_hash(&self) -> bool {
        self.dummy_hash.initialized()
    }
}

/// Strip a case-insensitive `Bearer ` prefix from an Authorization header value.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let header = header.trim_start();
    let prefix = header.get(..BEARER_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        Some(header[BEARER_PREFIX.len()..].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::db::{CreateUser, Database};

    fn test_config(token_lifetime: Option<i64>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_lifetime,
            bcrypt_cost: 4,
        }
    }

    fn service(db: &Database, config: AuthConfig) -> AuthService {
        AuthService::new(QueryService::new(db.clone()), config)
    }

    async fn setup() -> (Database, AuthService, UserRecord) {
        let db = Database::in_memory().await.unwrap();
        let auth = service(&db, test_config(None));
        let user = db
            .users()
            .create(CreateUser {
                username: "alice".to_string(),
                favorite_genre: "fiction".to_string(),
                password_hash: auth.hash_password("pw1234").await.unwrap(),
            })
            .await
            .unwrap();
        (db, auth, user)
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let (_, auth, user) = setup().await;
        assert_ne!(user.password_hash, "pw1234");
        assert!(auth.verify_password("pw1234", &user.password_hash).await.unwrap());
        assert!(!auth.verify_password("wrong", &user.password_hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let (_, auth, _) = setup().await;
        let a = auth.hash_password("same").await.unwrap();
        let b = auth.hash_password("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_issue_and_resolve_token() {
        let (_, auth, user) = setup().await;
        let token = auth.issue_token(&user).unwrap();
        assert!(token.starts_with("Bearer "));

        let resolved = auth.resolve_token(&token).await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id.clone()));

        // bare token works too
        let bare = extract_bearer(&token).unwrap();
        assert_matches!(auth.resolve_token(bare).await, Ok(Some(_)));
    }

    #[tokio::test]
    async fn test_invalid_tokens_resolve_to_none() {
        let (db, auth, user) = setup().await;

        assert_matches!(auth.resolve_token("").await, Ok(None));
        assert_matches!(auth.resolve_token("Bearer not-a-jwt").await, Ok(None));

        let other = service(&db, AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..test_config(None)
        });
        let foreign = other.issue_token(&user).unwrap();
        assert_matches!(auth.resolve_token(&foreign).await, Ok(None));
    }

    #[tokio::test]
    async fn test_expired_token_resolves_to_none() {
        let (db, auth, user) = setup().await;
        let expiring = service(&db, test_config(Some(-3600)));
        let token = expiring.issue_token(&user).unwrap();
        assert_matches!(expiring.resolve_token(&token).await, Ok(None));
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_resolves_to_none() {
        let (db, auth, user) = setup().await;
        let token = auth.issue_token(&user).unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user.id)
            .execute(db.pool())
            .await
            .unwrap();

        assert_matches!(auth.resolve_token(&token).await, Ok(None));
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_is_an_error() {
        let (db, _, user) = setup().await;
        for secs in [i64::MAX, i64::MIN] {
            let auth = service(&db, test_config(Some(secs)));
            assert_matches!(auth.issue_token(&user), Err(ServiceError::Internal(_)));
        }
    }

    #[tokio::test]
    async fn test_dummy_verification_hashes_once() {
        let (_, auth, _) = setup().await;
        assert!(!auth.has_dummy_hash());

        auth.verify_dummy_password("anything").await.unwrap();
        let first = auth.dummy_hash.get().cloned().unwrap();
        assert!(first.starts_with("$2"));

        auth.verify_dummy_password("anything else").await.unwrap();
        assert_eq!(auth.dummy_hash.get(), Some(&first));
    }

    #[test]
    fn test_extract_bearer_is_case_insensitive() {
        assert_eq!(extract_bearer("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("BEARER abc"), Some("abc"));
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("Bear"), None);
    }
}
