//! Content routes: quizzes, offers, shorts

use axum::Router;
use domain_content::{ContentService, MongoContentRepository, handlers};
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoContentRepository::new(&state.db);
    handlers::router(ContentService::new(repository), state.jwt.clone())
}

pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoContentRepository::new(db)
        .ensure_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create content indexes: {}", e))?;
    info!("Content collection indexes created");
    Ok(())
}
