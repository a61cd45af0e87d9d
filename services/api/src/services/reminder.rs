//! Reminders, their attachments, and ratings of places and professionals

use chrono::Utc;
use common::store::{DEFAULTED, Entity, Filter, Order};
use uuid::Uuid;

use super::media::MediaService;
use super::{ensure_owner, fetch, requester, upsert};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::media::{Media, UploadedFile};
use crate::models::reminder::{
    Rating, RatingRequest, RatingResponse, Reminder, ReminderDetail, ReminderMedia, ReminderRequest,
};
use crate::repositories::{Repo, Repositories};
use crate::validation::{require, validate_level};

#[derive(Clone)]
pub struct ReminderService {
    repos: Repositories,
    media: MediaService,
}

impl ReminderService {
    pub fn new(repos: Repositories, media: MediaService) -> Self {
        Self { repos, media }
    }

    pub async fn create(&self, caller: &AuthUser, req: ReminderRequest) -> ApiResult<Reminder> {
        require("Title", &req.title).map_err(ApiError::BadRequest)?;
        let user = requester(&self.repos, caller).await?;

        let reminder = Reminder {
            id: 0,
            uuid: Uuid::nil(),
            user_id: user.id,
            title: req.title.trim().to_string(),
            description: req.description,
            remind_at: req.remind_at,
            created_at: Utc::now(),
        };

        Ok(self.repos.reminders.create_with_omit(DEFAULTED, reminder).await?)
    }

    /// The caller's reminders, soonest first
    pub async fn list(&self, caller: &AuthUser) -> ApiResult<Vec<Reminder>> {
        let user = requester(&self.repos, caller).await?;
        Ok(self
            .repos
            .reminders
            .find(
                Filter::new()
                    .eq("user_id", user.id)
                    .order_by("remind_at", Order::Asc),
            )
            .await?)
    }

    async fn owned(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<Reminder> {
        let user = requester(&self.repos, caller).await?;
        let reminder = fetch(&self.repos.reminders, uuid, "Reminder").await?;
        ensure_owner(reminder.user_id, &user)?;
        Ok(reminder)
    }

    pub async fn get(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<ReminderDetail> {
        let reminder = self.owned(caller, uuid).await?;
        let media = self
            .media
            .linked(&self.repos.reminder_media, "reminder_id", reminder.id, |l: &ReminderMedia| l.media_id)
            .await?;

        Ok(ReminderDetail { reminder, media })
    }

    pub async fn update(&self, caller: &AuthUser, uuid: Uuid, req: ReminderRequest) -> ApiResult<Reminder> {
        require("Title", &req.title).map_err(ApiError::BadRequest)?;

        let mut reminder = self.owned(caller, uuid).await?;
        reminder.title = req.title.trim().to_string();
        reminder.description = req.description;
        reminder.remind_at = req.remind_at;

        Ok(self.repos.reminders.update(&reminder).await?)
    }

    pub async fn delete(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<()> {
        let reminder = self.owned(caller, uuid).await?;
        self.repos.reminders.delete(&reminder).await?;
        Ok(())
    }

    pub async fn attach_media(&self, caller: &AuthUser, uuid: Uuid, file: UploadedFile) -> ApiResult<Media> {
        let reminder = self.owned(caller, uuid).await?;
        let media = self.media.store(file).await?;

        self.repos
            .reminder_media
            .create_with_omit(DEFAULTED, ReminderMedia::new(reminder.id, media.id))
            .await?;
        Ok(media)
    }

    pub async fn rate_map(&self, caller: &AuthUser, uuid: Uuid, req: RatingRequest) -> ApiResult<RatingResponse> {
        self.rate(caller, uuid, req, &self.repos.maps, "Map", &self.repos.map_ratings)
            .await
    }

    pub async fn rate_health_service(
        &self,
        caller: &AuthUser,
        uuid: Uuid,
        req: RatingRequest,
    ) -> ApiResult<RatingResponse> {
        self.rate(
            caller,
            uuid,
            req,
            &self.repos.health_services,
            "Health service",
            &self.repos.health_service_ratings,
        )
        .await
    }

    pub async fn rate_medical(&self, caller: &AuthUser, uuid: Uuid, req: RatingRequest) -> ApiResult<RatingResponse> {
        self.rate(caller, uuid, req, &self.repos.medicals, "Medical", &self.repos.medical_ratings)
            .await
    }

    /// One rating per reminder and target; rating again replaces the level
    async fn rate<T, R>(
        &self,
        caller: &AuthUser,
        uuid: Uuid,
        req: RatingRequest,
        targets: &Repo<T>,
        label: &str,
        ratings: &Repo<R>,
    ) -> ApiResult<RatingResponse>
    where
        T: Entity,
        R: Rating,
    {
        validate_level(req.level).map_err(ApiError::BadRequest)?;
        let reminder = self.owned(caller, uuid).await?;
        let target = fetch(targets, req.target, label).await?;

        let level = req.level;
        let lookup = Filter::new()
            .eq("reminder_id", reminder.id)
            .eq(R::TARGET, target.id());
        let rating = upsert(ratings, lookup, R::rated(reminder.id, target.id(), level), |r| {
            r.set_level(level)
        })
        .await?;

        Ok(RatingResponse {
            reminder: reminder.uuid,
            target: req.target,
            level: rating.level(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::Medical;
    use crate::models::user::Role;
    use crate::services::fixtures::member;
    use crate::services::media::tests::{png, storage_config};
    use crate::storage::memory::MemoryStorage;
    use chrono::Duration;
    use std::sync::Arc;

    fn service(repos: &Repositories) -> ReminderService {
        let media = MediaService::new(repos.clone(), Arc::new(MemoryStorage::default()), &storage_config());
        ReminderService::new(repos.clone(), media)
    }

    fn request(title: &str, hours: i64) -> ReminderRequest {
        ReminderRequest {
            title: title.to_string(),
            description: String::new(),
            remind_at: Utc::now() + Duration::hours(hours),
        }
    }

    async fn medical(repos: &Repositories) -> Medical {
        repos
            .medicals
            .create_with_omit(DEFAULTED, Medical::new("Joana", "Lima", "123", "CRM-9"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reminders_are_listed_soonest_first() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let (_, ana) = member(&repos, "ana@example.com", Role::User).await;

        service.create(&ana, request("Later", 48)).await.unwrap();
        service.create(&ana, request("Sooner", 2)).await.unwrap();

        let titles: Vec<String> = service
            .list(&ana)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }

    #[tokio::test]
    async fn rating_again_replaces_the_level() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let (_, ana) = member(&repos, "ana@example.com", Role::User).await;
        let reminder = service.create(&ana, request("Checkup", 24)).await.unwrap();
        let doctor = medical(&repos).await;

        let rate = |level| RatingRequest {
            target: doctor.uuid,
            level,
        };
        service.rate_medical(&ana, reminder.uuid, rate(3)).await.unwrap();
        let rating = service.rate_medical(&ana, reminder.uuid, rate(5)).await.unwrap();

        assert_eq!(rating.level, 5);
        assert_eq!(rating.target, doctor.uuid);
        assert_eq!(repos.medical_ratings.count(Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn only_the_reminder_owner_rates() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let (_, ana) = member(&repos, "ana@example.com", Role::User).await;
        let (_, bia) = member(&repos, "bia@example.com", Role::User).await;
        let reminder = service.create(&ana, request("Checkup", 24)).await.unwrap();
        let doctor = medical(&repos).await;

        let err = service
            .rate_medical(
                &bia,
                reminder.uuid,
                RatingRequest {
                    target: doctor.uuid,
                    level: 4,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn rating_checks_level_and_target() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let (_, ana) = member(&repos, "ana@example.com", Role::User).await;
        let reminder = service.create(&ana, request("Checkup", 24)).await.unwrap();
        let doctor = medical(&repos).await;

        let err = service
            .rate_medical(
                &ana,
                reminder.uuid,
                RatingRequest {
                    target: doctor.uuid,
                    level: 7,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = service
            .rate_map(
                &ana,
                reminder.uuid,
                RatingRequest {
                    target: Uuid::new_v4(),
                    level: 2,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Map not found");
    }

    #[tokio::test]
    async fn attachments_show_in_detail() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let (_, ana) = member(&repos, "ana@example.com", Role::User).await;
        let reminder = service.create(&ana, request("Checkup", 24)).await.unwrap();

        service.attach_media(&ana, reminder.uuid, png("prescription.png")).await.unwrap();

        let detail = service.get(&ana, reminder.uuid).await.unwrap();
        assert_eq!(detail.media.len(), 1);
    }
}
