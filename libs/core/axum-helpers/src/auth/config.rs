//! Configuration types for JWT authentication.

use core_config::{ConfigError, FromEnv, env_parse_or, env_required};

/// Default token lifetime: one day
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - at least 32 characters
/// - `JWT_TTL_SECS` (optional, default 86400)
///
/// ```ignore
/// let config = JwtConfig::from_env()?;
/// let config = JwtConfig::new("my-super-secret-key-that-is-at-least-32-chars");
/// ```
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,
    /// Lifetime of issued tokens in seconds
    pub ttl_secs: i64,
}

impl JwtConfig {
    /// # Panics
    /// Panics if the secret is less than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let ttl_secs = env_parse_or("JWT_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if ttl_secs <= 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_TTL_SECS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self { secret, ttl_secs })
    }
}
