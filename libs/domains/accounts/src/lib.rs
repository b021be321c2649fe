//! Accounts Domain
//!
//! Storefront users, back-office admins and the superadmin, with
//! password signup/login that issues role-carrying JWTs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, role guards
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Hashing, credential checks, token issuing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_accounts::{AccountService, MongoAccountRepository, handlers};
//!
//! let repository = MongoAccountRepository::new(&db);
//! repository.ensure_indexes().await?;
//! let service = AccountService::new(repository, jwt_auth.clone());
//! let router = handlers::router(service, jwt_auth);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{AccountError, AccountResult};
pub use handlers::ApiDoc;
pub use models::{
    Admin, AdminAuthResponse, AdminResponse, AdminRole, CreateAdmin, LoginRequest, SignupRequest,
    SuperAdminSeed, User, UserAuthResponse, UserFilter, UserResponse,
};
pub use mongodb::MongoAccountRepository;
pub use repository::AccountRepository;
pub use service::AccountService;
