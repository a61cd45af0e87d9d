//! Daily severity reports against a symptom

use chrono::Utc;
use common::store::{DEFAULTED, Filter, Order};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::{ensure_owner, fetch, requester};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::symptom::{CreateMonitoringRequest, Monitoring, MonitoringResponse, Symptom};
use crate::repositories::Repositories;

const ALREADY_MONITORED: &str = "Symptom already monitored today";

#[derive(Clone)]
pub struct MonitoringService {
    repos: Repositories,
}

impl MonitoringService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Record today's severity; at most one report per symptom per day
    pub async fn create(
        &self,
        caller: &AuthUser,
        req: CreateMonitoringRequest,
    ) -> ApiResult<MonitoringResponse> {
        let user = requester(&self.repos, caller).await?;
        let symptom = fetch(&self.repos.symptoms, req.symptom, "Symptom").await?;

        if req.scale < 0 || req.scale > symptom.scale {
            return Err(ApiError::BadRequest(format!(
                "Scale must be between 0 and {}",
                symptom.scale
            )));
        }

        let today = Utc::now().date_naive();
        let existing = self
            .repos
            .monitorings
            .first(
                Filter::new()
                    .eq("user_id", user.id)
                    .eq("symptom_id", symptom.id)
                    .eq("recorded_on", today),
            )
            .await?;
        if existing.is_some() {
            return Err(ApiError::bad_request(ALREADY_MONITORED));
        }

        let monitoring = Monitoring {
            id: 0,
            uuid: Uuid::nil(),
            user_id: user.id,
            symptom_id: symptom.id,
            scale: req.scale,
            notes: req.notes.filter(|n| !n.trim().is_empty()),
            recorded_on: today,
            created_at: Utc::now(),
        };

        let monitoring = self
            .repos
            .monitorings
            .create_with_omit(DEFAULTED, monitoring)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ApiError::bad_request(ALREADY_MONITORED)
                } else {
                    e.into()
                }
            })?;

        info!("User {} monitored {} at {}", user.uuid, symptom.name, monitoring.scale);
        Ok(MonitoringResponse::new(monitoring, &symptom))
    }

    /// The caller's reports, newest day first
    pub async fn list(
        &self,
        caller: &AuthUser,
        symptom: Option<Uuid>,
    ) -> ApiResult<Vec<MonitoringResponse>> {
        let user = requester(&self.repos, caller).await?;

        let mut filter = Filter::new().eq("user_id", user.id);
        if let Some(uuid) = symptom {
            let symptom = fetch(&self.repos.symptoms, uuid, "Symptom").await?;
            filter = filter.eq("symptom_id", symptom.id);
        }

        let monitorings = self
            .repos
            .monitorings
            .find(filter.order_by("recorded_on", Order::Desc))
            .await?;

        let mut symptoms: HashMap<i64, Symptom> = HashMap::new();
        let mut responses = Vec::with_capacity(monitorings.len());
        for monitoring in monitorings {
            if !symptoms.contains_key(&monitoring.symptom_id) {
                let Some(symptom) = self
                    .repos
                    .symptoms
                    .first(Filter::new().eq("id", monitoring.symptom_id))
                    .await?
                else {
                    continue;
                };
                symptoms.insert(symptom.id, symptom);
            }
            if let Some(symptom) = symptoms.get(&monitoring.symptom_id) {
                responses.push(MonitoringResponse::new(monitoring, symptom));
            }
        }

        Ok(responses)
    }

    pub async fn delete(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<()> {
        let user = requester(&self.repos, caller).await?;
        let monitoring = fetch(&self.repos.monitorings, uuid, "Monitoring").await?;
        ensure_owner(monitoring.user_id, &user)?;

        self.repos.monitorings.delete(&monitoring).await?;
        Ok(())
    }
}
