//! MongoDB implementation of AccountRepository

use async_trait::async_trait;
use database::mongodb::{id_filter, is_duplicate_key_error, text_search};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::models::{Admin, AdminRole, User, UserFilter};
use crate::repository::AccountRepository;

/// MongoDB implementation of the AccountRepository
pub struct MongoAccountRepository {
    admins: Collection<Admin>,
    users: Collection<User>,
}

impl MongoAccountRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            admins: db.collection::<Admin>("admins"),
            users: db.collection::<User>("users"),
        }
    }

    /// Create the unique email indexes on both collections
    pub async fn ensure_indexes(&self) -> AccountResult<()> {
        let unique_email = || {
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };

        self.admins.create_index(unique_email()).await?;
        self.users.create_index(unique_email()).await?;

        tracing::info!("Account indexes ensured");
        Ok(())
    }

    fn map_insert_error(err: mongodb::error::Error, email: &str) -> AccountError {
        if is_duplicate_key_error(&err) {
            AccountError::DuplicateEmail(email.to_string())
        } else {
            err.into()
        }
    }

    /// Build a MongoDB filter document from UserFilter
    fn build_user_filter(filter: &UserFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref search) = filter.search {
            doc.insert("$or", text_search(&["name", "email"], search));
        }

        doc
    }
}

#[async_trait]
impl AccountRepository for MongoAccountRepository {
    #[instrument(skip(self, admin), fields(admin_email = %admin.email))]
    async fn create_admin(&self, admin: Admin) -> AccountResult<Admin> {
        self.admins
            .insert_one(&admin)
            .await
            .map_err(|e| Self::map_insert_error(e, &admin.email))?;

        tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin created successfully");
        Ok(admin)
    }

    #[instrument(skip(self))]
    async fn get_admin(&self, id: Uuid) -> AccountResult<Option<Admin>> {
        Ok(self.admins.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn find_admin_by_email(&self, email: &str) -> AccountResult<Option<Admin>> {
        Ok(self.admins.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn list_admins(&self) -> AccountResult<Vec<Admin>> {
        let cursor = self
            .admins
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn delete_admin(&self, id: Uuid) -> AccountResult<bool> {
        let result = self.admins.delete_one(id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(admin_id = %id, "Admin deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn superadmin_exists(&self) -> AccountResult<bool> {
        let role = AdminRole::SuperAdmin.to_string();
        let count = self.admins.count_documents(doc! { "role": role }).await?;
        Ok(count > 0)
    }

    #[instrument(skip(self, user), fields(user_email = %user.email))]
    async fn create_user(&self, user: User) -> AccountResult<User> {
        self.users
            .insert_one(&user)
            .await
            .map_err(|e| Self::map_insert_error(e, &user.email))?;

        tracing::info!(user_id = %user.id, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: Uuid) -> AccountResult<Option<User>> {
        Ok(self.users.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn list_users(&self, filter: UserFilter) -> AccountResult<Vec<User>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .users
            .find(Self::build_user_filter(&filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: Uuid) -> AccountResult<bool> {
        let result = self.users.delete_one(id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(user_id = %id, "User deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}
