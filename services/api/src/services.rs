//! Domain services
//!
//! Each service resolves the entities a request refers to by uuid, applies
//! its business rules, and persists through the repository bundle. Handlers
//! only translate the outcome into the response envelope.

use common::config::AppConfig;
use common::error::DatabaseError;
use common::store::{DEFAULTED, Entity, Filter};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::jwt::JwtService;
use crate::middleware::AuthUser;
use crate::models::user::User;
use crate::repositories::{Repo, Repositories};
use crate::storage::ObjectStorage;

pub mod article;
pub mod catalog;
pub mod forecast;
pub mod media;
pub mod medical_record;
pub mod monitoring;
pub mod question;
pub mod recipe;
pub mod reminder;
pub mod symptom;
pub mod treatment;
pub mod user;

pub use article::{ArticleService, CategoryService};
pub use catalog::{HealthServiceService, MapService, MedicalService};
pub use forecast::ForecastService;
pub use media::MediaService;
pub use medical_record::MedicalRecordService;
pub use monitoring::MonitoringService;
pub use question::QuestionService;
pub use recipe::RecipeService;
pub use reminder::ReminderService;
pub use symptom::SymptomService;
pub use treatment::TreatmentService;
pub use user::UserService;

/// Every domain service, built over one repository bundle
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub symptoms: SymptomService,
    pub monitorings: MonitoringService,
    pub treatments: TreatmentService,
    pub medical_records: MedicalRecordService,
    pub recipes: RecipeService,
    pub articles: ArticleService,
    pub categories: CategoryService,
    pub questions: QuestionService,
    pub reminders: ReminderService,
    pub maps: MapService,
    pub health_services: HealthServiceService,
    pub medicals: MedicalService,
    pub media: MediaService,
    pub forecasts: ForecastService,
}

impl Services {
    pub fn new(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        jwt: JwtService,
        config: &AppConfig,
    ) -> Self {
        let media = MediaService::new(repos.clone(), storage, &config.storage);

        Self {
            users: UserService::new(repos.clone(), jwt),
            symptoms: SymptomService::new(repos.clone()),
            monitorings: MonitoringService::new(repos.clone()),
            treatments: TreatmentService::new(repos.clone()),
            medical_records: MedicalRecordService::new(repos.clone()),
            recipes: RecipeService::new(repos.clone(), media.clone()),
            articles: ArticleService::new(repos.clone(), media.clone()),
            categories: CategoryService::new(repos.clone()),
            questions: QuestionService::new(repos.clone()),
            reminders: ReminderService::new(repos.clone(), media.clone()),
            maps: MapService::new(repos.clone()),
            health_services: HealthServiceService::new(repos.clone()),
            medicals: MedicalService::new(repos.clone()),
            forecasts: ForecastService::new(repos),
            media,
        }
    }
}

/// Look up a row by public uuid, naming it in the 404 message
pub(crate) async fn fetch<T: Entity>(repo: &Repo<T>, uuid: Uuid, label: &str) -> ApiResult<T> {
    repo.find_by_uuid(uuid).await.map_err(|e| match e {
        DatabaseError::NotFound { .. } => ApiError::not_found(format!("{} not found", label)),
        other => other.into(),
    })
}

/// Resolve the caller's account; deleted or banned accounts are refused
pub(crate) async fn requester(repos: &Repositories, caller: &AuthUser) -> ApiResult<User> {
    let user = fetch(&repos.users, caller.user_uuid, "User").await?;

    if user.deleted_at.is_some() {
        return Err(ApiError::not_found("User not found"));
    }
    if user.is_banned {
        return Err(ApiError::forbidden("Account is banned"));
    }

    Ok(user)
}

/// The caller must own the row
pub(crate) fn ensure_owner(owner_id: i64, user: &User) -> ApiResult<()> {
    if owner_id != user.id {
        return Err(ApiError::forbidden("You do not own this resource"));
    }
    Ok(())
}

/// The caller must own the row or be an administrator
pub(crate) fn ensure_owner_or_admin(owner_id: i64, user: &User) -> ApiResult<()> {
    if user.role() == crate::models::user::Role::Admin {
        return Ok(());
    }
    ensure_owner(owner_id, user)
}

/// Update the row matching `lookup` in place, or insert `fresh`.
///
/// When a concurrent writer inserts the same key first, the unique index
/// rejects our insert and the winner's row is updated instead.
pub(crate) async fn upsert<T, F>(repo: &Repo<T>, lookup: Filter, fresh: T, apply: F) -> ApiResult<T>
where
    T: Entity,
    F: Fn(&mut T) + Send,
{
    if let Some(mut row) = repo.first(lookup.clone()).await? {
        apply(&mut row);
        return Ok(repo.update(&row).await?);
    }

    match repo.create_with_omit(DEFAULTED, fresh).await {
        Ok(row) => Ok(row),
        Err(e) if e.is_unique_violation() => {
            let mut row = repo.first(lookup).await?.ok_or_else(|| {
                ApiError::Internal(format!("{} row vanished during upsert", T::TABLE))
            })?;
            apply(&mut row);
            Ok(repo.update(&row).await?)
        }
        Err(e) => Err(e.into()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::RecipeVote;
    use crate::models::user::Role;
    use chrono::Utc;

    fn vote(level: i32) -> RecipeVote {
        RecipeVote {
            id: 0,
            user_id: 1,
            recipe_id: 2,
            level,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates() {
        let repos = Repositories::in_memory();
        let lookup = Filter::new().eq("user_id", 1_i64).eq("recipe_id", 2_i64);

        upsert(&repos.recipe_votes, lookup.clone(), vote(2), |v| v.level = 2)
            .await
            .unwrap();
        let updated = upsert(&repos.recipe_votes, lookup, vote(5), |v| v.level = 5)
            .await
            .unwrap();

        assert_eq!(updated.level, 5);
        assert_eq!(repos.recipe_votes.count(Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn requester_refuses_banned_accounts() {
        let repos = Repositories::in_memory();
        let (mut user, caller) = fixtures::member(&repos, "ana@example.com", Role::User).await;
        user.is_banned = true;
        repos.users.update(&user).await.unwrap();

        let err = requester(&repos, &caller).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn fetch_names_the_missing_row() {
        let repos = Repositories::in_memory();
        let err = fetch(&repos.symptoms, Uuid::new_v4(), "Symptom").await.unwrap_err();
        assert_eq!(err.to_string(), "Symptom not found");
    }
}
