//! Application state shared across handlers

use common::config::AppConfig;
use sqlx::PgPool;
use std::sync::Arc;

use crate::jwt::JwtService;
use crate::repositories::Repositories;
use crate::services::Services;
use crate::storage::ObjectStorage;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Absent only when the router runs over in-memory repositories
    pub pool: Option<PgPool>,
    pub jwt: JwtService,
    pub services: Services,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        pool: Option<PgPool>,
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt);
        let services = Services::new(repos, storage, jwt.clone(), config);

        Self {
            pool,
            jwt,
            services,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    let settings = serde_json::from_value(serde_json::json!({
        "database_url": "postgres://localhost/carenet_test",
        "jwt_secret": "test-secret",
    }))
    .unwrap();
    AppConfig::from_settings(settings).unwrap()
}

#[cfg(test)]
impl AppState {
    /// State over in-memory repositories and storage
    pub fn in_memory() -> Self {
        use crate::storage::memory::MemoryStorage;

        Self::new(
            &test_config(),
            None,
            Repositories::in_memory(),
            Arc::new(MemoryStorage::default()),
        )
    }
}
