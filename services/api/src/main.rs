use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod jwt;
mod middleware;
mod models;
mod repositories;
mod response;
mod routes;
mod services;
mod state;
mod storage;
mod validation;

use common::config::AppConfig;
use common::database::{init_pool, run_migrations};
use forecast::{ForecastClient, ForecastPoller, PgForecastStore};
use tokio::net::TcpListener;

use crate::{
    repositories::Repositories,
    state::AppState,
    storage::{DisabledStorage, ObjectStorage, S3Storage},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.mode.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting API service");
    if config.telemetry.sentry_dsn.is_some() {
        info!("Error telemetry DSN configured");
    }

    // Initialize database connection pool
    let pool = init_pool(&config.database).await?;
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let storage: Arc<dyn ObjectStorage> = if config.storage.is_configured() {
        Arc::new(S3Storage::new(&config.storage).await?)
    } else {
        warn!("Object storage is not configured, uploads will be refused");
        Arc::new(DisabledStorage)
    };

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = match (config.forecast.enabled, ForecastClient::from_config(&config.forecast)) {
        (true, Some(client)) => {
            let store = Arc::new(PgForecastStore::new(pool.clone()));
            let poller = ForecastPoller::new(client, store, config.forecast.days);
            Some(poller.start(&config.forecast.schedule).await?)
        }
        (true, None) => {
            warn!("Forecast worker enabled without an API key, not starting it");
            None
        }
        (false, _) => None,
    };

    let address = config.server.bind_address();
    let repos = Repositories::postgres(pool.clone());
    let app_state = AppState::new(&config, Some(pool), repos, storage);

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
