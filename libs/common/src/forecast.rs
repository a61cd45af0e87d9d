//! Forecast rows written by the worker and read by the API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::{Entity, SqlValue};

/// One forecast day for a user location
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Forecast {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub country: String,
    pub city: String,
    pub date: NaiveDate,
    /// Short internal condition code
    pub condition: String,
    /// Description as the provider sent it
    pub condition_text: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_humidity: f64,
    pub chance_of_rain: i32,
    pub uv: f64,
    pub created_at: DateTime<Utc>,
}

impl Entity for Forecast {
    const TABLE: &'static str = "forecasts";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("country", self.country.clone().into()),
            ("city", self.city.clone().into()),
            ("date", self.date.into()),
            ("condition", self.condition.clone().into()),
            ("condition_text", self.condition_text.clone().into()),
            ("max_temp_c", self.max_temp_c.into()),
            ("min_temp_c", self.min_temp_c.into()),
            ("avg_humidity", self.avg_humidity.into()),
            ("chance_of_rain", self.chance_of_rain.into()),
            ("uv", self.uv.into()),
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

/// A distinct (country, city) pair among registered users
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow)]
pub struct Location {
    pub country: String,
    pub city: String,
}
