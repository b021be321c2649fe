//! Handler tests for the accounts domain
//!
//! Drive the router with `oneshot` against an in-memory repository:
//! status codes, JSON bodies and role gating.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{JwtAuth, JwtConfig, Role, hash_password};
use domain_accounts::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

#[derive(Default, Clone)]
struct InMemoryAccounts {
    admins: Arc<Mutex<Vec<Admin>>>,
    users: Arc<Mutex<Vec<User>>>,
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn create_admin(&self, admin: Admin) -> AccountResult<Admin> {
        self.admins.lock().unwrap().push(admin.clone());
        Ok(admin)
    }

    async fn get_admin(&self, id: Uuid) -> AccountResult<Option<Admin>> {
        Ok(self.admins.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> AccountResult<Option<Admin>> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn list_admins(&self) -> AccountResult<Vec<Admin>> {
        Ok(self.admins.lock().unwrap().clone())
    }

    async fn delete_admin(&self, id: Uuid) -> AccountResult<bool> {
        let mut admins = self.admins.lock().unwrap();
        let before = admins.len();
        admins.retain(|a| a.id != id);
        Ok(admins.len() < before)
    }

    async fn superadmin_exists(&self) -> AccountResult<bool> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.role == AdminRole::SuperAdmin))
    }

    async fn create_user(&self, user: User) -> AccountResult<User> {
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AccountResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self, _filter: UserFilter) -> AccountResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn delete_user(&self, id: Uuid) -> AccountResult<bool> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

fn jwt() -> JwtAuth {
    JwtAuth::new(&JwtConfig::new("handler-test-secret-long-enough-0123456"))
}

fn app(repo: InMemoryAccounts) -> Router {
    let auth = jwt();
    handlers::router(AccountService::new(repo, auth.clone()), auth)
}

fn token_for(role: Role) -> String {
    jwt()
        .create_token(Uuid::now_v7(), "someone@example.com", "Someone", role)
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_signup_returns_201_with_token() {
    let response = app(InMemoryAccounts::default())
        .oneshot(json_request(
            "POST",
            "/auth/user/signup",
            json!({"name": "Jane", "email": "Jane@Example.com", "password": "secret123"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: UserAuthResponse = json_body(response.into_body()).await;
    assert_eq!(body.user.email, "jane@example.com");
    assert!(!body.token.is_empty());
}

#[tokio::test]
async fn test_signup_short_password_is_400() {
    let response = app(InMemoryAccounts::default())
        .oneshot(json_request(
            "POST",
            "/auth/user/signup",
            json!({"name": "Jane", "email": "jane@example.com", "password": "123"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["password"].is_array());
}

#[tokio::test]
async fn test_duplicate_signup_is_409() {
    let repo = InMemoryAccounts::default();
    let signup = json!({"name": "Jane", "email": "jane@example.com", "password": "secret123"});

    let first = app(repo.clone())
        .oneshot(json_request("POST", "/auth/user/signup", signup.clone(), None))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app(repo)
        .oneshot(json_request("POST", "/auth/user/signup", signup, None))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_401() {
    let repo = InMemoryAccounts::default();
    repo.users.lock().unwrap().push(User::new(
        "Jane".into(),
        "jane@example.com".into(),
        None,
        hash_password("secret123").unwrap(),
    ));

    let response = app(repo)
        .oneshot(json_request(
            "POST",
            "/auth/user/login",
            json!({"email": "jane@example.com", "password": "nope-nope"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_claims() {
    let token = token_for(Role::Clinic);
    let response = app(InMemoryAccounts::default())
        .oneshot(empty_request("GET", "/auth/me", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["role"], "clinic");
}

#[tokio::test]
async fn test_users_list_requires_admin() {
    let anonymous = app(InMemoryAccounts::default())
        .oneshot(empty_request("GET", "/users", None))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let as_user = app(InMemoryAccounts::default())
        .oneshot(empty_request("GET", "/users", Some(&token_for(Role::User))))
        .await
        .unwrap();
    assert_eq!(as_user.status(), StatusCode::FORBIDDEN);

    let as_superadmin = app(InMemoryAccounts::default())
        .oneshot(empty_request(
            "GET",
            "/users",
            Some(&token_for(Role::SuperAdmin)),
        ))
        .await
        .unwrap();
    assert_eq!(as_superadmin.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_signup_requires_superadmin() {
    let body = json!({"name": "Ops", "email": "ops@example.com", "password": "opspass"});

    let as_admin = app(InMemoryAccounts::default())
        .oneshot(json_request(
            "POST",
            "/auth/admin/signup",
            body.clone(),
            Some(&token_for(Role::Admin)),
        ))
        .await
        .unwrap();
    assert_eq!(as_admin.status(), StatusCode::FORBIDDEN);

    let as_superadmin = app(InMemoryAccounts::default())
        .oneshot(json_request(
            "POST",
            "/auth/admin/signup",
            body,
            Some(&token_for(Role::SuperAdmin)),
        ))
        .await
        .unwrap();
    assert_eq!(as_superadmin.status(), StatusCode::CREATED);

    let admin: AdminResponse = json_body(as_superadmin.into_body()).await;
    assert_eq!(admin.role, AdminRole::Admin);
}

#[tokio::test]
async fn test_get_unknown_user_is_404() {
    let uri = format!("/users/{}", Uuid::now_v7());
    let response = app(InMemoryAccounts::default())
        .oneshot(empty_request("GET", &uri, Some(&token_for(Role::Admin))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_uuid_is_400() {
    let response = app(InMemoryAccounts::default())
        .oneshot(empty_request(
            "GET",
            "/users/not-a-uuid",
            Some(&token_for(Role::Admin)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
