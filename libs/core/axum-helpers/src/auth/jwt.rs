use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Principal kinds that can hold a token
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Storefront customer
    User,
    /// Clinic logged into its own panel
    Clinic,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether a holder of `self` passes a check that requires `required`.
    ///
    /// Superadmin satisfies admin; every other role only satisfies itself.
    pub fn satisfies(self, required: Role) -> bool {
        self == required || (self == Role::SuperAdmin && required == Role::Admin)
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JwtClaims {
    /// Id of the admin, user or clinic the token was issued to
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl JwtClaims {
    pub fn subject_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|required| self.role.satisfies(*required))
    }

    pub fn is_admin(&self) -> bool {
        self.role.satisfies(Role::Admin)
    }

    /// True when the token belongs to the given principal (e.g. a clinic acting on itself)
    pub fn is_principal(&self, role: Role, id: Uuid) -> bool {
        self.role == role && self.subject_id() == Some(id)
    }
}

/// Stateless HS256 JWT issuer and verifier
#[derive(Clone)]
pub struct JwtAuth {
    secret: Arc<str>,
    ttl_secs: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(ttl_secs = config.ttl_secs, "JWT auth initialized");
        Self {
            secret: Arc::from(config.secret.as_str()),
            ttl_secs: config.ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a signed token for a principal
    pub fn create_token(
        &self,
        subject: Uuid,
        email: &str,
        name: &str,
        role: Role,
    ) -> eyre::Result<String> {
        let now = Utc::now();

        let claims = JwtClaims {
            sub: subject.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify signature and expiry, returning the decoded claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(jsonwebtoken::Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}
