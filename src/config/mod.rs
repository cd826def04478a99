//! Application configuration management

use std::env;

use anyhow::{Context, Result, bail};

use crate::services::auth::{BCRYPT_COST_RANGE, DEFAULT_BCRYPT_COST};
use crate::services::events::DEFAULT_EVENT_CAPACITY;

/// Longest session token lifetime accepted (ten years)
const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface the HTTP server binds to
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite URL, e.g. `sqlite://data/library.db` or `sqlite::memory:`
    pub database_url: String,

    /// Secret used to sign and verify session tokens
    pub jwt_secret: String,

    /// Bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,

    /// Session token lifetime; unset means tokens never expire
    pub token_lifetime_secs: Option<i64>,

    /// How far a subscriber may lag behind before it misses events
    pub event_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is required")?;

        let jwt_secret = lookup("JWT_SECRET")
            .context("JWT_SECRET is required")?
            .trim()
            .to_string();
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let port = match lookup("PORT") {
            Some(port) => port.parse().context("Invalid PORT")?,
            None => 4000,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(cost) => cost.parse().context("Invalid BCRYPT_COST")?,
            None => DEFAULT_BCRYPT_COST,
        };
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end()
            );
        }

        let token_lifetime_secs = lookup("TOKEN_LIFETIME_SECS")
            .map(|secs| secs.parse::<i64>())
            .transpose()
            .context("Invalid TOKEN_LIFETIME_SECS")?;
        if let Some(secs) = token_lifetime_secs {
            if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&secs) {
                bail!("TOKEN_LIFETIME_SECS must be between 1 and {MAX_TOKEN_LIFETIME_SECS}");
            }
        }

        let event_capacity: usize = match lookup("EVENT_CHANNEL_CAPACITY") {
            Some(capacity) => capacity
                .parse()
                .context("Invalid EVENT_CHANNEL_CAPACITY")?,
            None => DEFAULT_EVENT_CAPACITY,
        };
        if event_capacity == 0 {
            bail!("EVENT_CHANNEL_CAPACITY must be positive");
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url,
            jwt_secret,
            bcrypt_cost,
            token_lifetime_secs,
            event_capacity,
        })
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = assert_ok!(load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", " secret \n"),
        ]));

        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.jwt_secret, "secret");
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
        assert_eq!(config.token_lifetime_secs, None);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.bind_addr(), "0.0.0.0:4000");
    }

    #[test]
    fn test_required_variables() {
        let err = assert_err!(load(&[("JWT_SECRET", "secret")]));
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let err = load(&[("DATABASE_URL", "sqlite::memory:"), ("JWT_SECRET", "   ")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "sqlite://data/library.db"),
            ("JWT_SECRET", "secret"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("BCRYPT_COST", "12"),
            ("TOKEN_LIFETIME_SECS", "3600"),
            ("EVENT_CHANNEL_CAPACITY", "16"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.token_lifetime_secs, Some(3600));
        assert_eq!(config.event_capacity, 16);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("PORT", "not-a-port"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_out_of_range_values_fail_fast() {
        for (key, value) in [
            ("BCRYPT_COST", "3"),
            ("BCRYPT_COST", "32"),
            ("BCRYPT_COST", "ten"),
            ("TOKEN_LIFETIME_SECS", "0"),
            ("TOKEN_LIFETIME_SECS", "-60"),
            ("TOKEN_LIFETIME_SECS", "9223372036854775807"),
            ("EVENT_CHANNEL_CAPACITY", "0"),
            ("EVENT_CHANNEL_CAPACITY", "lots"),
        ] {
            let err = assert_err!(load(&[
                ("DATABASE_URL", "sqlite::memory:"),
                ("JWT_SECRET", "secret"),
                (key, value),
            ]));
            assert!(err.to_string().contains(key), "{key}={value}: {err}");
        }
    }
}
