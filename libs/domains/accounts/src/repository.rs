use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AccountResult;
use crate::models::{Admin, User, UserFilter};

/// Repository trait for admin and user persistence
///
/// Email arguments are expected to be normalized already.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    // Admins

    async fn create_admin(&self, admin: Admin) -> AccountResult<Admin>;

    async fn get_admin(&self, id: Uuid) -> AccountResult<Option<Admin>>;

    async fn find_admin_by_email(&self, email: &str) -> AccountResult<Option<Admin>>;

    async fn list_admins(&self) -> AccountResult<Vec<Admin>>;

    /// Returns false when no admin had this id
    async fn delete_admin(&self, id: Uuid) -> AccountResult<bool>;

    async fn superadmin_exists(&self) -> AccountResult<bool>;

    // Users

    async fn create_user(&self, user: User) -> AccountResult<User>;

    async fn get_user(&self, id: Uuid) -> AccountResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AccountResult<Option<User>>;

    async fn list_users(&self, filter: UserFilter) -> AccountResult<Vec<User>>;

    /// Returns false when no user had this id
    async fn delete_user(&self, id: Uuid) -> AccountResult<bool>;
}
