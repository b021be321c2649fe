//! Account Service - signup, login and account administration

use axum_helpers::{JwtAuth, Role, hash_password, verify_password};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AccountError, AccountResult};
use crate::models::{
    Admin, AdminAuthResponse, AdminResponse, AdminRole, CreateAdmin, LoginRequest, SignupRequest,
    SuperAdminSeed, User, UserAuthResponse, UserFilter, UserResponse, normalize_email,
};
use crate::repository::AccountRepository;

pub struct AccountService<R: AccountRepository> {
    repository: Arc<R>,
    auth: JwtAuth,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repository: R, auth: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            auth,
        }
    }

    fn hash(password: &str) -> AccountResult<String> {
        hash_password(password).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            AccountError::Internal("Failed to hash password".to_string())
        })
    }

    fn issue_token(&self, id: Uuid, email: &str, name: &str, role: Role) -> AccountResult<String> {
        self.auth.create_token(id, email, name, role).map_err(|e| {
            tracing::error!("Failed to create token: {:?}", e);
            AccountError::Internal("Failed to create token".to_string())
        })
    }

    /// Register a storefront user and log them in
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup_user(&self, input: SignupRequest) -> AccountResult<UserAuthResponse> {
        input
            .validate()
            .map_err(|e| AccountError::Validation(e.to_string()))?;

        let email = normalize_email(&input.email);
        if self.repository.find_user_by_email(&email).await?.is_some() {
            return Err(AccountError::DuplicateEmail(email));
        }

        let user = User::new(
            input.name.trim().to_string(),
            email,
            input.phone,
            Self::hash(&input.password)?,
        );
        let user = self.repository.create_user(user).await?;

        let token = self.issue_token(user.id, &user.email, &user.name, Role::User)?;
        Ok(UserAuthResponse {
            token,
            user: user.into(),
        })
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login_user(&self, input: LoginRequest) -> AccountResult<UserAuthResponse> {
        let email = normalize_email(&input.email);
        let user = self
            .repository
            .find_user_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "Rejected user login");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.issue_token(user.id, &user.email, &user.name, Role::User)?;
        Ok(UserAuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Create a regular admin; callers are gated to superadmins at the route
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_admin(&self, input: CreateAdmin) -> AccountResult<AdminResponse> {
        input
            .validate()
            .map_err(|e| AccountError::Validation(e.to_string()))?;

        let email = normalize_email(&input.email);
        if self.repository.find_admin_by_email(&email).await?.is_some() {
            return Err(AccountError::DuplicateEmail(email));
        }

        let admin = Admin::new(
            input.name.trim().to_string(),
            email,
            Self::hash(&input.password)?,
            AdminRole::Admin,
        );
        Ok(self.repository.create_admin(admin).await?.into())
    }

    /// Admin or superadmin login; the token carries the stored role
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login_admin(&self, input: LoginRequest) -> AccountResult<AdminAuthResponse> {
        let email = normalize_email(&input.email);
        let admin = self
            .repository
            .find_admin_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !verify_password(&input.password, &admin.password_hash) {
            tracing::info!(admin_id = %admin.id, "Rejected admin login");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.issue_token(admin.id, &admin.email, &admin.name, admin.role.into())?;
        Ok(AdminAuthResponse {
            token,
            admin: admin.into(),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> AccountResult<Vec<UserResponse>> {
        let users = self.repository.list_users(filter).await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> AccountResult<UserResponse> {
        self.repository
            .get_user(id)
            .await?
            .map(Into::into)
            .ok_or(AccountError::UserNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> AccountResult<()> {
        if !self.repository.delete_user(id).await? {
            return Err(AccountError::UserNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_admins(&self) -> AccountResult<Vec<AdminResponse>> {
        let admins = self.repository.list_admins().await?;
        Ok(admins.into_iter().map(Into::into).collect())
    }

    /// Delete a regular admin. Superadmin accounts cannot be removed through the API.
    #[instrument(skip(self))]
    pub async fn delete_admin(&self, id: Uuid) -> AccountResult<()> {
        let admin = self
            .repository
            .get_admin(id)
            .await?
            .ok_or(AccountError::AdminNotFound(id))?;

        if admin.role == AdminRole::SuperAdmin {
            return Err(AccountError::Forbidden(
                "Superadmin accounts cannot be deleted".to_string(),
            ));
        }

        if !self.repository.delete_admin(id).await? {
            return Err(AccountError::AdminNotFound(id));
        }
        Ok(())
    }

    /// Create the first superadmin if none exists. Returns true when one was created.
    #[instrument(skip(self, seed), fields(email = %seed.email))]
    pub async fn ensure_superadmin(&self, seed: SuperAdminSeed) -> AccountResult<bool> {
        if self.repository.superadmin_exists().await? {
            tracing::debug!("Superadmin already present, skipping bootstrap");
            return Ok(false);
        }

        if seed.password.len() < 6 {
            return Err(AccountError::Validation(
                "SUPERADMIN_PASSWORD must be at least 6 characters".to_string(),
            ));
        }

        let admin = Admin::new(
            seed.name,
            normalize_email(&seed.email),
            Self::hash(&seed.password)?,
            AdminRole::SuperAdmin,
        );
        let admin = self.repository.create_admin(admin).await?;

        tracing::info!(admin_id = %admin.id, "Superadmin bootstrapped");
        Ok(true)
    }
}

impl<R: AccountRepository> Clone for AccountService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            auth: self.auth.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockAccountRepository;
    use axum_helpers::JwtConfig;
    use mockall::predicate::eq;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("accounts-test-secret-long-enough-0123"))
    }

    fn stored_user(password: &str) -> User {
        User::new(
            "Jane".to_string(),
            "jane@example.com".to_string(),
            None,
            hash_password(password).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_signup_normalizes_email_and_issues_user_token() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_user_by_email()
            .with(eq("jane@example.com"))
            .returning(|_| Ok(None));
        repo.expect_create_user().returning(Ok);

        let service = AccountService::new(repo, auth());
        let response = service
            .signup_user(SignupRequest {
                name: " Jane ".to_string(),
                email: "Jane@Example.com".to_string(),
                password: "secret123".to_string(),
                phone: None,
            })
            .await
            .unwrap();

        assert_eq!(response.user.email, "jane@example.com");
        assert_eq!(response.user.name, "Jane");
        let claims = auth().verify_token(&response.token).unwrap();
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.subject_id(), Some(response.user.id));
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_user_by_email()
            .returning(|_| Ok(Some(stored_user("whatever"))));
        repo.expect_create_user().never();

        let service = AccountService::new(repo, auth());
        let err = service
            .signup_user(SignupRequest {
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                password: "secret123".to_string(),
                phone: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_login_user_wrong_password() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_user_by_email()
            .returning(|_| Ok(Some(stored_user("secret123"))));

        let service = AccountService::new(repo, auth());
        let err = service
            .login_user(LoginRequest {
                email: "jane@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_user_unknown_email() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_user_by_email().returning(|_| Ok(None));

        let service = AccountService::new(repo, auth());
        let err = service
            .login_user(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_admin_token_carries_stored_role() {
        let admin = Admin::new(
            "Root".to_string(),
            "root@example.com".to_string(),
            hash_password("rootpass").unwrap(),
            AdminRole::SuperAdmin,
        );
        let mut repo = MockAccountRepository::new();
        repo.expect_find_admin_by_email()
            .returning(move |_| Ok(Some(admin.clone())));

        let service = AccountService::new(repo, auth());
        let response = service
            .login_admin(LoginRequest {
                email: "root@example.com".to_string(),
                password: "rootpass".to_string(),
            })
            .await
            .unwrap();

        let claims = auth().verify_token(&response.token).unwrap();
        assert_eq!(claims.role, Role::SuperAdmin);
        assert_eq!(response.admin.role, AdminRole::SuperAdmin);
    }

    #[tokio::test]
    async fn test_delete_admin_refuses_superadmin() {
        let admin = Admin::new(
            "Root".to_string(),
            "root@example.com".to_string(),
            "hash".to_string(),
            AdminRole::SuperAdmin,
        );
        let id = admin.id;
        let mut repo = MockAccountRepository::new();
        repo.expect_get_admin()
            .with(eq(id))
            .returning(move |_| Ok(Some(admin.clone())));
        repo.expect_delete_admin().never();

        let service = AccountService::new(repo, auth());
        let err = service.delete_admin(id).await.unwrap_err();
        assert!(matches!(err, AccountError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repo = MockAccountRepository::new();
        repo.expect_delete_user().returning(|_| Ok(false));

        let service = AccountService::new(repo, auth());
        let id = Uuid::now_v7();
        let err = service.delete_user(id).await.unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_ensure_superadmin_skips_when_present() {
        let mut repo = MockAccountRepository::new();
        repo.expect_superadmin_exists().returning(|| Ok(true));
        repo.expect_create_admin().never();

        let service = AccountService::new(repo, auth());
        let created = service
            .ensure_superadmin(SuperAdminSeed {
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                password: "rootpass".to_string(),
            })
            .await
            .unwrap();
        assert!(!created);
    }

    #[tokio::test]
    async fn test_ensure_superadmin_creates_superadmin() {
        let mut repo = MockAccountRepository::new();
        repo.expect_superadmin_exists().returning(|| Ok(false));
        repo.expect_create_admin()
            .withf(|admin| admin.role == AdminRole::SuperAdmin && admin.email == "root@example.com")
            .returning(Ok);

        let service = AccountService::new(repo, auth());
        let created = service
            .ensure_superadmin(SuperAdminSeed {
                name: "Root".to_string(),
                email: "ROOT@example.com".to_string(),
                password: "rootpass".to_string(),
            })
            .await
            .unwrap();
        assert!(created);
    }
}
