//! Accounts routes: signup/login, users, admins

use axum::Router;
use domain_accounts::{AccountService, MongoAccountRepository, handlers};
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoAccountRepository::new(&state.db);
    let service = AccountService::new(repository, state.jwt.clone());
    handlers::router(service, state.jwt.clone())
}

/// Unique email indexes, then the optional superadmin seed
pub async fn init(state: &AppState) -> eyre::Result<()> {
    let repository = MongoAccountRepository::new(&state.db);
    repository
        .ensure_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create account indexes: {}", e))?;
    info!("Account collection indexes created");

    if let Some(seed) = state.config.superadmin.clone() {
        let service = AccountService::new(repository, state.jwt.clone());
        let created = service
            .ensure_superadmin(seed)
            .await
            .map_err(|e| eyre::eyre!("Failed to bootstrap superadmin: {}", e))?;
        if created {
            info!("Superadmin account created");
        }
    }
    Ok(())
}
