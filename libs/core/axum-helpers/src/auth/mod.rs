//! Authentication and authorization module.
//!
//! This module provides:
//! - Stateless HS256 JWT creation and verification
//! - Role-gated middleware for protected routes
//! - Argon2 password hashing
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, Role, RoleGuard, require_roles};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let admin = Router::new()
//!     .route("/users", get(list_users))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         RoleGuard::new(auth.clone(), &[Role::Admin]),
//!         require_roles,
//!     ));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod password;

// Re-export commonly used types
pub use config::{DEFAULT_TOKEN_TTL_SECS, JwtConfig};
pub use jwt::{JwtAuth, JwtClaims, Role};
pub use middleware::{RoleGuard, jwt_auth_middleware, optional_jwt_auth_middleware, require_roles};
pub use password::{hash_password, verify_password};
