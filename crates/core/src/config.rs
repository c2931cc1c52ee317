//! Runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services. Nothing in this crate reads environment variables during request
//! handling; the binaries call [`AppConfig::from_env`] once and hand the
//! result (or values derived from it) down.

use crate::{HmsError, HmsResult};

/// Listen address used when `HMS_REST_ADDR` is not set.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Database URL used when `HMS_DATABASE_URL` is not set. `mode=rwc` creates
/// the file on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hms.db?mode=rwc";

/// Development-only fallback signing secret. Deployments must override it;
/// constructing a config with this value logs a warning.
pub const DEFAULT_JWT_SECRET: &str = "hospital-secret-key-change-in-production";

/// Token lifetime used when `HMS_TOKEN_TTL_HOURS` is not set.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Bcrypt cost used when `HMS_BCRYPT_COST` is not set.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Application configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    rest_addr: String,
    database_url: String,
    jwt_secret: String,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

impl AppConfig {
    /// Create a new `AppConfig` from already-resolved values.
    ///
    /// # Errors
    ///
    /// Returns `HmsError::InvalidInput` if the secret is blank, the token
    /// lifetime is not positive, or the bcrypt cost is outside the range the
    /// algorithm accepts (4..=31).
    pub fn new(
        rest_addr: String,
        database_url: String,
        jwt_secret: String,
        token_ttl: chrono::Duration,
        bcrypt_cost: u32,
    ) -> HmsResult<Self> {
        if jwt_secret.trim().is_empty() {
            return Err(HmsError::InvalidInput(
                "jwt_secret cannot be empty".into(),
            ));
        }
        if token_ttl <= chrono::Duration::zero() {
            return Err(HmsError::InvalidInput(
                "token lifetime must be positive".into(),
            ));
        }
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(HmsError::InvalidInput(
                "bcrypt cost must be between 4 and 31".into(),
            ));
        }

        if jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!(
                "using the built-in JWT secret; set HMS_JWT_SECRET before deploying"
            );
        }

        Ok(Self {
            rest_addr,
            database_url,
            jwt_secret,
            token_ttl,
            bcrypt_cost,
        })
    }

    /// Resolve configuration from the process environment, applying defaults
    /// for anything unset.
    ///
    /// Recognised variables: `HMS_REST_ADDR`, `HMS_DATABASE_URL`,
    /// `HMS_JWT_SECRET`, `HMS_TOKEN_TTL_HOURS`, `HMS_BCRYPT_COST`.
    ///
    /// # Errors
    ///
    /// Returns `HmsError::InvalidInput` when a set variable fails to parse or
    /// a resolved value fails `AppConfig::new` validation.
    pub fn from_env() -> HmsResult<Self> {
        let rest_addr =
            std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
        let database_url =
            std::env::var("HMS_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let jwt_secret =
            std::env::var("HMS_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.into());

        let token_ttl_hours = parse_env_value(
            "HMS_TOKEN_TTL_HOURS",
            std::env::var("HMS_TOKEN_TTL_HOURS").ok(),
            DEFAULT_TOKEN_TTL_HOURS,
        )?;
        let bcrypt_cost = parse_env_value(
            "HMS_BCRYPT_COST",
            std::env::var("HMS_BCRYPT_COST").ok(),
            DEFAULT_BCRYPT_COST,
        )?;

        Self::new(
            rest_addr,
            database_url,
            jwt_secret,
            chrono::Duration::hours(token_ttl_hours),
            bcrypt_cost,
        )
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        self.token_ttl
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}

/// Parse an optional environment value, falling back to `default` when the
/// variable is unset or blank.
fn parse_env_value<T: std::str::FromStr>(
    name: &str,
    value: Option<String>,
    default: T,
) -> HmsResult<T> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    match value {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| HmsError::InvalidInput(format!("{name} is not a valid number: {v}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret(secret: &str) -> HmsResult<AppConfig> {
        AppConfig::new(
            DEFAULT_REST_ADDR.into(),
            "sqlite::memory:".into(),
            secret.into(),
            chrono::Duration::hours(24),
            DEFAULT_BCRYPT_COST,
        )
    }

    #[test]
    fn accepts_reasonable_values() {
        let cfg = config_with_secret("unit-test-secret").expect("config should be valid");
        assert_eq!(cfg.rest_addr(), DEFAULT_REST_ADDR);
        assert_eq!(cfg.bcrypt_cost(), DEFAULT_BCRYPT_COST);
        assert_eq!(cfg.token_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn rejects_blank_secret() {
        assert!(config_with_secret("   ").is_err());
    }

    #[test]
    fn rejects_non_positive_token_lifetime() {
        let result = AppConfig::new(
            DEFAULT_REST_ADDR.into(),
            "sqlite::memory:".into(),
            "unit-test-secret".into(),
            chrono::Duration::zero(),
            DEFAULT_BCRYPT_COST,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_out_of_range_bcrypt_cost() {
        let result = AppConfig::new(
            DEFAULT_REST_ADDR.into(),
            "sqlite::memory:".into(),
            "unit-test-secret".into(),
            chrono::Duration::hours(1),
            32,
        );
        assert!(result.is_err());
    }

    #[test]
    fn parse_env_value_falls_back_on_unset_or_blank() {
        let unset: Option<String> = None;
        assert_eq!(
            parse_env_value("HMS_TOKEN_TTL_HOURS", unset, 24i64).expect("default should apply"),
            24
        );
        assert_eq!(
            parse_env_value("HMS_TOKEN_TTL_HOURS", Some("  ".into()), 24i64)
                .expect("blank should fall back"),
            24
        );
        assert_eq!(
            parse_env_value("HMS_TOKEN_TTL_HOURS", Some("48".into()), 24i64)
                .expect("set value should parse"),
            48
        );
        assert!(parse_env_value("HMS_TOKEN_TTL_HOURS", Some("soon".into()), 24i64).is_err());
    }
}
