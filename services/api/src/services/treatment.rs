//! Treatment plans owned by a user

use chrono::Utc;
use common::store::{DEFAULTED, Filter, Order};
use uuid::Uuid;

use super::{ensure_owner, fetch, requester};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::treatment::{Treatment, TreatmentRequest};
use crate::repositories::Repositories;
use crate::validation::require;

#[derive(Clone)]
pub struct TreatmentService {
    repos: Repositories,
}

impl TreatmentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, caller: &AuthUser, req: TreatmentRequest) -> ApiResult<Treatment> {
        require("Name", &req.name).map_err(ApiError::BadRequest)?;
        let user = requester(&self.repos, caller).await?;

        let treatment = Treatment {
            id: 0,
            uuid: Uuid::nil(),
            user_id: user.id,
            name: req.name.trim().to_string(),
            start_date: req.start_date,
            frequency: req.frequency,
            shots: req.shots,
            notes: req.notes,
            created_at: Utc::now(),
        };

        Ok(self
            .repos
            .treatments
            .create_with_omit(DEFAULTED, treatment)
            .await?)
    }

    pub async fn list(&self, caller: &AuthUser) -> ApiResult<Vec<Treatment>> {
        let user = requester(&self.repos, caller).await?;
        Ok(self
            .repos
            .treatments
            .find(
                Filter::new()
                    .eq("user_id", user.id)
                    .order_by("start_date", Order::Desc),
            )
            .await?)
    }

    async fn owned(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<Treatment> {
        let user = requester(&self.repos, caller).await?;
        let treatment = fetch(&self.repos.treatments, uuid, "Treatment").await?;
        ensure_owner(treatment.user_id, &user)?;
        Ok(treatment)
    }

    pub async fn get(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<Treatment> {
        self.owned(caller, uuid).await
    }

    pub async fn update(
        &self,
        caller: &AuthUser,
        uuid: Uuid,
        req: TreatmentRequest,
    ) -> ApiResult<Treatment> {
        require("Name", &req.name).map_err(ApiError::BadRequest)?;

        let mut treatment = self.owned(caller, uuid).await?;
        treatment.name = req.name.trim().to_string();
        treatment.start_date = req.start_date;
        treatment.frequency = req.frequency;
        treatment.shots = req.shots;
        treatment.notes = req.notes;

        Ok(self.repos.treatments.update(&treatment).await?)
    }

    pub async fn delete(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<()> {
        let treatment = self.owned(caller, uuid).await?;
        self.repos.treatments.delete(&treatment).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::treatment::{Frequency, Shot};
    use crate::models::user::Role;
    use crate::services::fixtures::member;
    use chrono::NaiveDate;

    fn request(name: &str) -> TreatmentRequest {
        TreatmentRequest {
            name: name.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            frequency: vec![Frequency {
                day: "monday".to_string(),
                times: vec!["08:00".to_string(), "20:00".to_string()],
            }],
            shots: vec![Shot {
                name: "Insulin".to_string(),
                dose: "10u".to_string(),
            }],
            notes: None,
        }
    }

    #[tokio::test]
    async fn treatments_are_private_to_their_owner() {
        let repos = Repositories::in_memory();
        let service = TreatmentService::new(repos.clone());
        let (_, ana) = member(&repos, "ana@example.com", Role::User).await;
        let (_, bia) = member(&repos, "bia@example.com", Role::User).await;

        let created = service.create(&ana, request("Insulin")).await.unwrap();
        assert_eq!(created.frequency[0].times.len(), 2);

        assert!(matches!(
            service.get(&bia, created.uuid).await.unwrap_err(),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            service.delete(&bia, created.uuid).await.unwrap_err(),
            ApiError::Forbidden(_)
        ));
        assert!(service.list(&bia).await.unwrap().is_empty());

        let updated = service
            .update(&ana, created.uuid, request("Insulin glargine"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Insulin glargine");

        service.delete(&ana, created.uuid).await.unwrap();
        assert!(service.list(&ana).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn name_is_required() {
        let repos = Repositories::in_memory();
        let service = TreatmentService::new(repos.clone());
        let (_, ana) = member(&repos, "ana@example.com", Role::User).await;

        let err = service.create(&ana, request(" ")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
