//! MongoDB connector and utilities

pub mod codec;
mod config;
mod connector;
mod errors;
mod health;

pub use config::MongoConfig;
pub use codec::{
    id_filter, now_bson, regex_escape, text_search, to_stored_bson, to_stored_document, uuid_bson,
};
pub use connector::{MongoError, connect, connect_from_config, connect_from_config_with_retry};
pub use errors::{DUPLICATE_KEY_CODE, is_duplicate_key_error};
pub use health::{HealthStatus, check_health, check_health_detailed};

pub use mongodb::{Client, Collection, Database};
