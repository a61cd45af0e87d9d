//! Forecast worker
//!
//! Periodically collects the distinct user locations, asks the external
//! forecast provider for the next few days at each of them, and caches one
//! [`common::forecast::Forecast`] row per location and day.

use common::error::DatabaseError;
use thiserror::Error;

pub mod client;
pub mod conditions;
pub mod models;
pub mod poller;
pub mod store;

pub use client::ForecastClient;
pub use poller::ForecastPoller;
pub use store::{ForecastStore, PgForecastStore};

/// Errors raised while fetching or persisting forecasts
#[derive(Error, Debug)]
pub enum ForecastError {
    /// The provider could not be reached
    #[error("Forecast request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Forecast provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider's payload did not have the expected shape
    #[error("Failed to decode forecast payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
