//! Persistence port used by the worker

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use common::forecast::{Forecast, Location};
use common::store::{DEFAULTED, PgStore, Repository};
use sqlx::PgPool;

/// Where the worker reads locations from and writes forecasts to
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Distinct (country, city) pairs among active users
    async fn locations(&self) -> DatabaseResult<Vec<Location>>;

    /// Insert the forecast days fetched for one location
    async fn save(&self, forecasts: Vec<Forecast>) -> DatabaseResult<Vec<Forecast>>;
}

#[derive(Clone)]
pub struct PgForecastStore {
    pool: PgPool,
    forecasts: PgStore<Forecast>,
}

impl PgForecastStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            forecasts: PgStore::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ForecastStore for PgForecastStore {
    async fn locations(&self) -> DatabaseResult<Vec<Location>> {
        sqlx::query_as::<_, Location>(
            "SELECT DISTINCT country, city FROM users
             WHERE deleted_at IS NULL AND country <> '' AND city <> ''
             ORDER BY country, city",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("select user locations", e))
    }

    async fn save(&self, forecasts: Vec<Forecast>) -> DatabaseResult<Vec<Forecast>> {
        self.forecasts.create_many(DEFAULTED, forecasts).await
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use common::store::MemoryStore;

    /// Fixed locations plus an in-memory forecasts table
    #[derive(Clone, Default)]
    pub struct MemoryForecastStore {
        pub locations: Vec<Location>,
        pub forecasts: MemoryStore<Forecast>,
    }

    #[async_trait]
    impl ForecastStore for MemoryForecastStore {
        async fn locations(&self) -> DatabaseResult<Vec<Location>> {
            Ok(self.locations.clone())
        }

        async fn save(&self, forecasts: Vec<Forecast>) -> DatabaseResult<Vec<Forecast>> {
            self.forecasts.create_many(DEFAULTED, forecasts).await
        }
    }
}
