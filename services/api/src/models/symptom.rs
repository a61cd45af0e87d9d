//! Symptom catalog, tracking, and monitoring

use chrono::{DateTime, NaiveDate, Utc};
use common::store::{Entity, SqlValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog entry; `scale` is the highest severity a user may report
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Symptom {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub is_active: bool,
    pub scale: i32,
    pub created_at: DateTime<Utc>,
}

impl Entity for Symptom {
    const TABLE: &'static str = "symptoms";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("name", self.name.clone().into()),
            ("is_active", self.is_active.into()),
            ("scale", self.scale.into()),
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

super::join_entity!(
    /// A user tracking a symptom
    SymptomUser,
    "symptom_users",
    user_id,
    symptom_id
);

/// One severity report per (user, symptom, day)
#[derive(Debug, Clone, FromRow)]
pub struct Monitoring {
    pub id: i64,
    pub uuid: Uuid,
    pub user_id: i64,
    pub symptom_id: i64,
    pub scale: i32,
    pub notes: Option<String>,
    pub recorded_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Entity for Monitoring {
    const TABLE: &'static str = "monitorings";
    const UNIQUE: &'static [&'static [&'static str]] =
        &[&["user_id", "symptom_id", "recorded_on"]];

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("user_id", self.user_id.into()),
            ("symptom_id", self.symptom_id.into()),
            ("scale", self.scale.into()),
            ("notes", self.notes.clone().into()),
            ("recorded_on", self.recorded_on.into()),
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

#[derive(Debug, Deserialize)]
pub struct SymptomRequest {
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub scale: i32,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct SymptomQuery {
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateMonitoringRequest {
    /// Public uuid of the symptom
    pub symptom: Uuid,
    pub scale: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonitoringQuery {
    pub symptom: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MonitoringResponse {
    pub uuid: Uuid,
    pub symptom: Uuid,
    pub symptom_name: String,
    pub scale: i32,
    pub notes: Option<String>,
    pub recorded_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl MonitoringResponse {
    pub fn new(monitoring: Monitoring, symptom: &Symptom) -> Self {
        Self {
            uuid: monitoring.uuid,
            symptom: symptom.uuid,
            symptom_name: symptom.name.clone(),
            scale: monitoring.scale,
            notes: monitoring.notes,
            recorded_on: monitoring.recorded_on,
            created_at: monitoring.created_at,
        }
    }
}
