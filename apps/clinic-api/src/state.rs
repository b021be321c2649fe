//! Application state shared by the route builders and the readiness check.

use axum_helpers::JwtAuth;
use mongodb::{Client, Database};

/// Cloned into every router; all members are cheap handle clones.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// MongoDB database instance
    pub db: Database,
    /// Token issuing and verification for every domain
    pub jwt: JwtAuth,
}
