use axum_helpers::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Back-office role stored on an admin account
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdminRole {
    #[default]
    Admin,
    SuperAdmin,
}

impl From<AdminRole> for Role {
    fn from(role: AdminRole) -> Self {
        match role {
            AdminRole::Admin => Role::Admin,
            AdminRole::SuperAdmin => Role::SuperAdmin,
        }
    }
}

/// Admin entity as stored in the `admins` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Lowercased, unique
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(name: String, email: String, password_hash: String, role: AdminRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Admin response DTO (without password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            role: admin.role,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

/// Storefront customer as stored in the `users` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Lowercased, unique
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, phone: Option<String>, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            email,
            phone,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for storefront signup
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// DTO for creating an admin (superadmin only)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAdmin {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// DTO for any password login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Token plus the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserAuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Token plus the authenticated admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminAuthResponse {
    pub token: String,
    pub admin: AdminResponse,
}

/// Query filters for listing users
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct UserFilter {
    /// Search in name and email
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> i64 {
    50
}

/// Credentials used to create the first superadmin at startup
#[derive(Debug, Clone)]
pub struct SuperAdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Lowercase and trim an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
