//! # Axum Helpers
//!
//! Shared building blocks for the HTTP layer of every domain crate.
//!
//! ## Modules
//!
//! - **[`auth`]**: JWT issuing and verification, role guards, password hashing
//! - **[`server`]**: Router setup, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: UUID paths, validated JSON, authenticated caller
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = create_router::<ApiDoc>(Router::new())?;
//!     create_app(router, &ServerConfig::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    JwtAuth, JwtClaims, JwtConfig, Role, RoleGuard, hash_password, jwt_auth_middleware,
    optional_jwt_auth_middleware, require_roles, verify_password,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{AuthUser, MaybeAuthUser, UuidPath, UuidPathPair, ValidatedJson};
