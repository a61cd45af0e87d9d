//! Reminders, their attachments, and the ratings recorded against them

use chrono::{DateTime, Utc};
use common::store::{Entity, SqlValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::media::Media;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reminder {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub remind_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Reminder {
    const TABLE: &'static str = "reminders";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("user_id", self.user_id.into()),
            ("title", self.title.clone().into()),
            ("description", self.description.clone().into()),
            ("remind_at", self.remind_at.into()),
            ("created_at", self.created_at.into()),
        ]
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn assign_default(&mut self, column: &str, now: DateTime<Utc>) {
        match column {
            "uuid" => self.uuid = Uuid::new_v4(),
            "created_at" => self.created_at = now,
            _ => {}
        }
    }
}

/// A 1..=5 score a reminder gives to a catalog entry
pub trait Rating: Entity {
    /// Foreign key column of the rated entry
    const TARGET: &'static str;

    fn rated(reminder_id: i64, target_id: i64, level: i32) -> Self;
    fn level(&self) -> i32;
    fn set_level(&mut self, level: i32);
}

super::join_entity!(ReminderMedia, "reminder_media", reminder_id, media_id);
super::rating_entity!(MapRating, "map_ratings", map_id);
super::rating_entity!(HealthServiceRating, "health_service_ratings", health_service_id);
super::rating_entity!(MedicalRating, "medical_ratings", medical_id);

#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub remind_at: DateTime<Utc>,
}

/// Rate a catalog entry from a reminder
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    /// Public uuid of the map, health service, or medical being rated
    pub target: Uuid,
    pub level: i32,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub reminder: Uuid,
    pub target: Uuid,
    pub level: i32,
}

#[derive(Debug, Serialize)]
pub struct ReminderDetail {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub media: Vec<Media>,
}
