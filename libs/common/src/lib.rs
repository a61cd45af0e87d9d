//! Common library for the CareNet backend
//!
//! This crate provides functionality shared by the API service and the
//! forecast worker: configuration, database connectivity, the generic
//! persistence adapter, and the forecast entity.
//!
//! ```rust,no_run
//! use common::config::AppConfig;
//! use common::database::{init_pool, health_check};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let pool = init_pool(&config.database).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod forecast;
pub mod store;
