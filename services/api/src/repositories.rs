//! Repositories for database operations
//!
//! One [`Repository`] per table, bundled so services can be built from a
//! single value. Production wires [`PgStore`]s over a shared pool; tests
//! wire [`common::store::MemoryStore`]s.

use common::forecast::Forecast;
use common::store::{PgStore, Repository};
use sqlx::PgPool;
use std::sync::Arc;

use crate::models::{
    article::{Article, ArticleCategory, ArticleMedia, Category},
    catalog::{HealthService, Map, Medical},
    media::Media,
    question::{Answer, Question},
    recipe::{Recipe, RecipeMedia, RecipeVote},
    reminder::{HealthServiceRating, MapRating, MedicalRating, Reminder, ReminderMedia},
    symptom::{Monitoring, Symptom, SymptomUser},
    treatment::{MedicalRecord, Treatment},
    user::User,
};

pub type Repo<T> = Arc<dyn Repository<T>>;

#[derive(Clone)]
pub struct Repositories {
    pub users: Repo<User>,
    pub symptoms: Repo<Symptom>,
    pub symptom_users: Repo<SymptomUser>,
    pub monitorings: Repo<Monitoring>,
    pub treatments: Repo<Treatment>,
    pub medical_records: Repo<MedicalRecord>,
    pub recipes: Repo<Recipe>,
    pub recipe_votes: Repo<RecipeVote>,
    pub recipe_media: Repo<RecipeMedia>,
    pub articles: Repo<Article>,
    pub categories: Repo<Category>,
    pub article_categories: Repo<ArticleCategory>,
    pub article_media: Repo<ArticleMedia>,
    pub questions: Repo<Question>,
    pub answers: Repo<Answer>,
    pub reminders: Repo<Reminder>,
    pub reminder_media: Repo<ReminderMedia>,
    pub maps: Repo<Map>,
    pub health_services: Repo<HealthService>,
    pub medicals: Repo<Medical>,
    pub map_ratings: Repo<MapRating>,
    pub health_service_ratings: Repo<HealthServiceRating>,
    pub medical_ratings: Repo<MedicalRating>,
    pub media: Repo<Media>,
    pub forecasts: Repo<Forecast>,
}

impl Repositories {
    /// Every repository backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        fn pg<T>(pool: &PgPool) -> Repo<T>
        where
            T: common::store::Entity + for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
        {
            Arc::new(PgStore::<T>::new(pool.clone()))
        }

        Self {
            users: pg(&pool),
            symptoms: pg(&pool),
            symptom_users: pg(&pool),
            monitorings: pg(&pool),
            treatments: pg(&pool),
            medical_records: pg(&pool),
            recipes: pg(&pool),
            recipe_votes: pg(&pool),
            recipe_media: pg(&pool),
            articles: pg(&pool),
            categories: pg(&pool),
            article_categories: pg(&pool),
            article_media: pg(&pool),
            questions: pg(&pool),
            answers: pg(&pool),
            reminders: pg(&pool),
            reminder_media: pg(&pool),
            maps: pg(&pool),
            health_services: pg(&pool),
            medicals: pg(&pool),
            map_ratings: pg(&pool),
            health_service_ratings: pg(&pool),
            medical_ratings: pg(&pool),
            media: pg(&pool),
            forecasts: pg(&pool),
        }
    }

    /// Every repository held in process
    #[cfg(test)]
    pub fn in_memory() -> Self {
        use common::store::MemoryStore;

        fn mem<T: common::store::Entity>() -> Repo<T> {
            Arc::new(MemoryStore::<T>::new())
        }

        Self {
            users: mem(),
            symptoms: mem(),
            symptom_users: mem(),
            monitorings: mem(),
            treatments: mem(),
            medical_records: mem(),
            recipes: mem(),
            recipe_votes: mem(),
            recipe_media: mem(),
            articles: mem(),
            categories: mem(),
            article_categories: mem(),
            article_media: mem(),
            questions: mem(),
            answers: mem(),
            reminders: mem(),
            reminder_media: mem(),
            maps: mem(),
            health_services: mem(),
            medicals: mem(),
            map_ratings: mem(),
            health_service_ratings: mem(),
            medical_ratings: mem(),
            media: mem(),
            forecasts: mem(),
        }
    }
}
