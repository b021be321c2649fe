use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_optional, env_parse_or, server::ServerConfig,
};
use domain_accounts::SuperAdminSeed;
use domain_catalog::DEFAULT_TOP_PRODUCTS_SLOTS;
use std::time::Duration;

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub environment: Environment,
    /// Length of the top-products slot list
    pub top_products_slots: usize,
    /// Created on startup when no superadmin exists yet
    pub superadmin: Option<SuperAdminSeed>,
    /// Upper bound on shutdown cleanup once a signal arrives
    pub shutdown_grace: Duration,
}

/// `SUPERADMIN_EMAIL` and `SUPERADMIN_PASSWORD` go together; the name is optional
fn superadmin_from_env() -> Result<Option<SuperAdminSeed>, ConfigError> {
    match (
        env_optional("SUPERADMIN_EMAIL"),
        env_optional("SUPERADMIN_PASSWORD"),
    ) {
        (Some(email), Some(password)) => Ok(Some(SuperAdminSeed {
            name: env_optional("SUPERADMIN_NAME").unwrap_or_else(|| "Super Admin".to_string()),
            email,
            password,
        })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar(
            "SUPERADMIN_PASSWORD".to_string(),
        )),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar("SUPERADMIN_EMAIL".to_string())),
    }
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        let top_products_slots = env_parse_or("TOP_PRODUCTS_SLOTS", DEFAULT_TOP_PRODUCTS_SLOTS)?;
        if top_products_slots == 0 {
            return Err(ConfigError::ParseError {
                key: "TOP_PRODUCTS_SLOTS".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        let shutdown_grace = Duration::from_secs(env_parse_or("SHUTDOWN_GRACE_SECS", 30u64)?);

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            jwt,
            environment,
            top_products_slots,
            superadmin: superadmin_from_env()?,
            shutdown_grace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "config-test-secret-long-enough-01234567";

    fn base_vars() -> Vec<(&'static str, Option<&'static str>)> {
        vec![
            ("MONGO_URI", Some("mongodb://localhost:27017")),
            ("MONGODB_URL", None),
            ("MONGO_URL", None),
            ("MONGO_DATABASE", None),
            ("JWT_SECRET", Some(SECRET)),
            ("JWT_TTL_SECS", None),
            ("HOST", None),
            ("PORT", None),
            ("APP_ENV", None),
            ("TOP_PRODUCTS_SLOTS", None),
            ("SUPERADMIN_EMAIL", None),
            ("SUPERADMIN_PASSWORD", None),
            ("SUPERADMIN_NAME", None),
            ("SHUTDOWN_GRACE_SECS", None),
        ]
    }

    fn with(overrides: &[(&'static str, Option<&'static str>)]) -> Vec<(&'static str, Option<&'static str>)> {
        let mut vars = base_vars();
        for (key, value) in overrides {
            vars.retain(|(k, _)| k != key);
            vars.push((key, *value));
        }
        vars
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(base_vars(), || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.server.port, 5000);
            assert_eq!(config.mongodb.database(), "clinic_commerce");
            assert_eq!(config.top_products_slots, 8);
            assert!(config.superadmin.is_none());
            assert!(config.environment.is_development());
            assert_eq!(config.app.name, "clinic_api");
            assert_eq!(config.shutdown_grace, Duration::from_secs(30));
        });
    }

    #[test]
    fn test_shutdown_grace() {
        temp_env::with_vars(with(&[("SHUTDOWN_GRACE_SECS", Some("5"))]), || {
            assert_eq!(Config::from_env().unwrap().shutdown_grace, Duration::from_secs(5));
        });
        temp_env::with_vars(with(&[("SHUTDOWN_GRACE_SECS", Some("-1"))]), || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_missing_jwt_secret() {
        temp_env::with_vars(with(&[("JWT_SECRET", None)]), || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_missing_mongo_uri() {
        temp_env::with_vars(with(&[("MONGO_URI", None)]), || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("MONGO_URI"));
        });
    }

    #[test]
    fn test_top_products_slots() {
        temp_env::with_vars(with(&[("TOP_PRODUCTS_SLOTS", Some("12"))]), || {
            assert_eq!(Config::from_env().unwrap().top_products_slots, 12);
        });
        temp_env::with_vars(with(&[("TOP_PRODUCTS_SLOTS", Some("0"))]), || {
            assert!(Config::from_env().is_err());
        });
        temp_env::with_vars(with(&[("TOP_PRODUCTS_SLOTS", Some("eight"))]), || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_superadmin_seed() {
        temp_env::with_vars(
            with(&[
                ("SUPERADMIN_EMAIL", Some("root@example.com")),
                ("SUPERADMIN_PASSWORD", Some("changeme123")),
            ]),
            || {
                let seed = Config::from_env().unwrap().superadmin.unwrap();
                assert_eq!(seed.email, "root@example.com");
                assert_eq!(seed.name, "Super Admin");
            },
        );

        temp_env::with_vars(
            with(&[("SUPERADMIN_EMAIL", Some("root@example.com"))]),
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("SUPERADMIN_PASSWORD"));
            },
        );
    }
}
