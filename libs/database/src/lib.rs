//! Database library providing the MongoDB connector and shared connection utilities
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client, configuration and health checks
//! - `config` - Configuration support with `core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//! use core_config::FromEnv;
//!
//! let config = MongoConfig::from_env()?;
//! let client = mongodb::connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
