//! The single health-profile record each user keeps

use chrono::Utc;
use common::store::{DEFAULTED, Filter};
use tracing::warn;
use uuid::Uuid;

use super::{ensure_owner, fetch, requester};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::treatment::{MedicalRecord, MedicalRecordRequest};
use crate::repositories::Repositories;

const ALREADY_EXISTS: &str = "Medical record already exists";

#[derive(Clone)]
pub struct MedicalRecordService {
    repos: Repositories,
}

impl MedicalRecordService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        caller: &AuthUser,
        req: MedicalRecordRequest,
    ) -> ApiResult<MedicalRecord> {
        let user = requester(&self.repos, caller).await?;

        let existing = self
            .repos
            .medical_records
            .first(Filter::new().eq("user_id", user.id))
            .await?;
        if existing.is_some() {
            return Err(ApiError::bad_request(ALREADY_EXISTS));
        }

        let now = Utc::now();
        let record = MedicalRecord {
            id: 0,
            uuid: Uuid::nil(),
            user_id: user.id,
            disability: req.disability,
            comorbidity: req.comorbidity,
            support_network: req.support_network,
            diagnosis_year: req.diagnosis_year,
            uses_medication: req.uses_medication,
            medication_notes: req.medication_notes,
            created_at: now,
            updated_at: now,
        };

        self.repos
            .medical_records
            .create_with_omit(DEFAULTED, record)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ApiError::bad_request(ALREADY_EXISTS)
                } else {
                    e.into()
                }
            })
    }

    pub async fn mine(&self, caller: &AuthUser) -> ApiResult<MedicalRecord> {
        let user = requester(&self.repos, caller).await?;
        self.repos
            .medical_records
            .first(Filter::new().eq("user_id", user.id))
            .await?
            .ok_or_else(|| ApiError::not_found("Medical record not found"))
    }

    /// Only the user the record belongs to may change it, whatever their role
    pub async fn update(
        &self,
        caller: &AuthUser,
        uuid: Uuid,
        req: MedicalRecordRequest,
    ) -> ApiResult<MedicalRecord> {
        let user = requester(&self.repos, caller).await?;
        let mut record = fetch(&self.repos.medical_records, uuid, "Medical record").await?;

        if let Err(e) = ensure_owner(record.user_id, &user) {
            warn!("User {} tried to update medical record {}", user.uuid, record.uuid);
            return Err(e);
        }

        record.disability = req.disability;
        record.comorbidity = req.comorbidity;
        record.support_network = req.support_network;
        record.diagnosis_year = req.diagnosis_year;
        record.uses_medication = req.uses_medication;
        record.medication_notes = req.medication_notes;
        record.updated_at = Utc::now();

        Ok(self.repos.medical_records.update(&record).await?)
    }
}
