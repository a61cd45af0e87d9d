//! Symptom catalog and per-user tracking

use chrono::Utc;
use common::store::{DEFAULTED, Filter, Order};
use tracing::info;
use uuid::Uuid;

use super::{fetch, requester};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::symptom::{Symptom, SymptomRequest, SymptomUser};
use crate::repositories::Repositories;
use crate::validation::require;

#[derive(Clone)]
pub struct SymptomService {
    repos: Repositories,
}

fn check(req: &SymptomRequest) -> ApiResult<()> {
    require("Name", &req.name).map_err(ApiError::BadRequest)?;
    if req.scale < 1 {
        return Err(ApiError::bad_request("Scale must be at least 1"));
    }
    Ok(())
}

impl SymptomService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Active symptoms by name; administrators may ask for every one
    pub async fn list(&self, caller: &AuthUser, all: bool) -> ApiResult<Vec<Symptom>> {
        let mut filter = Filter::new();
        if !(all && caller.is_admin()) {
            filter = filter.eq("is_active", true);
        }

        Ok(self
            .repos
            .symptoms
            .find(filter.order_by("name", Order::Asc))
            .await?)
    }

    pub async fn get(&self, uuid: Uuid) -> ApiResult<Symptom> {
        fetch(&self.repos.symptoms, uuid, "Symptom").await
    }

    pub async fn create(&self, req: SymptomRequest) -> ApiResult<Symptom> {
        check(&req)?;

        let symptom = Symptom {
            id: 0,
            uuid: Uuid::nil(),
            name: req.name.trim().to_string(),
            is_active: req.is_active,
            scale: req.scale,
            created_at: Utc::now(),
        };

        let symptom = self
            .repos
            .symptoms
            .create_with_omit(DEFAULTED, symptom)
            .await?;
        info!("Created symptom {} ({})", symptom.name, symptom.uuid);
        Ok(symptom)
    }

    pub async fn update(&self, uuid: Uuid, req: SymptomRequest) -> ApiResult<Symptom> {
        check(&req)?;

        let mut symptom = self.get(uuid).await?;
        symptom.name = req.name.trim().to_string();
        symptom.is_active = req.is_active;
        symptom.scale = req.scale;

        Ok(self.repos.symptoms.update(&symptom).await?)
    }

    pub async fn delete(&self, uuid: Uuid) -> ApiResult<()> {
        let symptom = self.get(uuid).await?;
        self.repos.symptoms.delete(&symptom).await?;
        Ok(())
    }

    /// Symptoms the caller tracks
    pub async fn tracked(&self, caller: &AuthUser) -> ApiResult<Vec<Symptom>> {
        let user = requester(&self.repos, caller).await?;
        let links = self
            .repos
            .symptom_users
            .find(
                Filter::new()
                    .eq("user_id", user.id)
                    .order_by("created_at", Order::Asc),
            )
            .await?;

        let mut symptoms = Vec::with_capacity(links.len());
        for link in links {
            if let Some(symptom) = self
                .repos
                .symptoms
                .first(Filter::new().eq("id", link.symptom_id))
                .await?
            {
                symptoms.push(symptom);
            }
        }
        Ok(symptoms)
    }

    pub async fn track(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<Symptom> {
        let user = requester(&self.repos, caller).await?;
        let symptom = self.get(uuid).await?;

        let existing = self
            .repos
            .symptom_users
            .find_item_by_ids("user_id", user.id, "symptom_id", symptom.id)
            .await?;
        if existing.is_some() {
            return Err(ApiError::bad_request("Symptom already tracked"));
        }

        self.repos
            .symptom_users
            .create_with_omit(DEFAULTED, SymptomUser::new(user.id, symptom.id))
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ApiError::bad_request("Symptom already tracked")
                } else {
                    e.into()
                }
            })?;

        Ok(symptom)
    }

    pub async fn untrack(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<()> {
        let user = requester(&self.repos, caller).await?;
        let symptom = self.get(uuid).await?;

        let link = self
            .repos
            .symptom_users
            .find_item_by_ids("user_id", user.id, "symptom_id", symptom.id)
            .await?
            .ok_or_else(|| ApiError::not_found("Symptom is not tracked"))?;

        self.repos.symptom_users.delete(&link).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::services::fixtures::member;

    fn request(name: &str, active: bool, scale: i32) -> SymptomRequest {
        SymptomRequest {
            name: name.to_string(),
            is_active: active,
            scale,
        }
    }

    #[tokio::test]
    async fn scale_must_be_positive() {
        let service = SymptomService::new(Repositories::in_memory());
        let err = service.create(request("Fatigue", true, 0)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn inactive_symptoms_are_listed_for_admins_only() {
        let repos = Repositories::in_memory();
        let service = SymptomService::new(repos.clone());
        let (_, user) = member(&repos, "ana@example.com", Role::User).await;
        let (_, admin) = member(&repos, "root@example.com", Role::Admin).await;

        service.create(request("Nausea", true, 3)).await.unwrap();
        service.create(request("Dizziness", false, 3)).await.unwrap();

        assert_eq!(service.list(&user, true).await.unwrap().len(), 1);
        assert_eq!(service.list(&admin, false).await.unwrap().len(), 1);

        let names: Vec<String> = service
            .list(&admin, true)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Dizziness", "Nausea"]);
    }

    #[tokio::test]
    async fn tracking_twice_is_rejected() {
        let repos = Repositories::in_memory();
        let service = SymptomService::new(repos.clone());
        let (_, caller) = member(&repos, "ana@example.com", Role::User).await;
        let symptom = service.create(request("Fatigue", true, 3)).await.unwrap();

        service.track(&caller, symptom.uuid).await.unwrap();
        let err = service.track(&caller, symptom.uuid).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let tracked = service.tracked(&caller).await.unwrap();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].uuid, symptom.uuid);

        service.untrack(&caller, symptom.uuid).await.unwrap();
        assert!(service.tracked(&caller).await.unwrap().is_empty());
        assert!(service.untrack(&caller, symptom.uuid).await.is_err());
    }
}
