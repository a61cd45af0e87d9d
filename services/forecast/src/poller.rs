use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::client::ForecastClient;
use crate::store::ForecastStore;
use crate::ForecastError;

/// Scheduled job refreshing the forecast cache
#[derive(Clone)]
pub struct ForecastPoller {
    client: ForecastClient,
    store: Arc<dyn ForecastStore>,
    days: u8,
}

/// Outcome of one tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub locations: usize,
    pub saved: usize,
    pub failed: usize,
}

impl ForecastPoller {
    pub fn new(client: ForecastClient, store: Arc<dyn ForecastStore>, days: u8) -> Self {
        Self { client, store, days }
    }

    /// Fetch and persist forecasts for every known location.
    ///
    /// A failing location is reported and skipped; only failing to list the
    /// locations aborts the tick.
    pub async fn run_once(&self) -> Result<PollSummary, ForecastError> {
        let locations = self.store.locations().await?;
        info!("Refreshing forecasts for {} locations", locations.len());

        let mut summary = PollSummary {
            locations: locations.len(),
            ..PollSummary::default()
        };

        for location in &locations {
            let outcome = match self.client.fetch(location, self.days).await {
                Ok(days) if days.is_empty() => {
                    warn!("No forecast days returned for {}, {}", location.city, location.country);
                    continue;
                }
                Ok(days) => {
                    let rows = days.into_iter().map(|day| day.into_forecast(location)).collect();
                    self.store.save(rows).await.map_err(ForecastError::from)
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(saved) => summary.saved += saved.len(),
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        target: "telemetry",
                        country = %location.country,
                        city = %location.city,
                        "Forecast refresh failed: {}",
                        e
                    );
                }
            }
        }

        info!(
            "Forecast refresh finished: {} rows saved, {} locations failed",
            summary.saved, summary.failed
        );
        Ok(summary)
    }

    /// Register the job on `schedule` (cron with seconds) and start the scheduler.
    ///
    /// The first run happens at the first matching tick, not immediately.
    pub async fn start(&self, schedule: &str) -> Result<JobScheduler> {
        let poller = self.clone();

        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_, _| {
            let poller = poller.clone();
            Box::pin(async move {
                info!("Forecast job executed");
                if let Err(e) = poller.run_once().await {
                    error!(target: "telemetry", "Forecast job failed: {}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started forecast scheduler with schedule: {}", schedule);
        Ok(scheduler)
    }
}
