//! API routes module
//!
//! Every domain router uses absolute paths, so they are merged rather than
//! nested. The result is nested under `/api` by `axum_helpers::create_router`.

pub mod accounts;
pub mod catalog;
pub mod clinics;
pub mod content;
pub mod health;
pub mod orders;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(accounts::router(state))
        .merge(clinics::router(state))
        .merge(catalog::router(state))
        .merge(orders::router(state))
        .merge(content::router(state))
        .merge(health::router(state.clone()))
}

/// Indexes for every collection plus the superadmin seed
pub async fn init(state: &AppState) -> eyre::Result<()> {
    accounts::init(state).await?;
    clinics::init_indexes(&state.db).await?;
    catalog::init_indexes(&state.db).await?;
    orders::init_indexes(&state.db).await?;
    content::init_indexes(&state.db).await?;
    Ok(())
}
