//! Clinic Commerce API server.

use axum::Router;
use axum_helpers::JwtAuth;
use axum_helpers::server::{create_production_app, health_router};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

/// Connect to MongoDB and assemble the shared state
async fn bootstrap(config: Config) -> eyre::Result<AppState> {
    info!(url = %config.mongodb.redacted_url(), "Connecting to MongoDB");
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());
    info!(database = %db.name(), "MongoDB ready");

    let jwt = JwtAuth::new(&config.jwt);
    Ok(AppState {
        config,
        mongo_client,
        db,
        jwt,
    })
}

/// Domain routes with OpenAPI docs, plus the health endpoints
fn app(state: &AppState) -> eyre::Result<Router> {
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(state))?;
    Ok(router.merge(health_router(state.config.app.clone())))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let state = bootstrap(config).await?;
    // Indexes and the superadmin seed go in before the listener opens
    api::init(&state).await?;
    let app = app(&state)?;

    let grace = state.config.shutdown_grace;
    info!(
        port = state.config.server.port,
        grace_secs = grace.as_secs(),
        "Serving Clinic Commerce API"
    );

    let mongo_client = state.mongo_client.clone();
    create_production_app(app, &state.config.server, grace, async move {
        // Pooled handles still live in the router, so don't wait on them
        mongo_client.shutdown().immediate(true).await;
        info!("MongoDB client shut down");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Stopped");
    Ok(())
}
