//! Reference data: map pins, the health-service directory, and the
//! registry of medical professionals

use chrono::{DateTime, Utc};
use common::store::{Entity, SqlValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Map {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub address: String,
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

impl Entity for Map {
    const TABLE: &'static str = "maps";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("name", self.name.clone().into()),
            ("address", self.address.clone().into()),
            ("kind", self.kind.clone().into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
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

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HealthService {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for HealthService {
    const TABLE: &'static str = "health_services";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("name", self.name.clone().into()),
            ("description", self.description.clone().into()),
            ("phone", self.phone.clone().into()),
            ("address", self.address.clone().into()),
            ("city", self.city.clone().into()),
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

/// Registered medical professional
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Medical {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub cjppu_number: String,
    pub profession_number: String,
    pub created_at: DateTime<Utc>,
}

impl Medical {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        cjppu_number: impl Into<String>,
        profession_number: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            uuid: Uuid::nil(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            cjppu_number: cjppu_number.into(),
            profession_number: profession_number.into(),
            created_at: Utc::now(),
        }
    }
}

impl Entity for Medical {
    const TABLE: &'static str = "medicals";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("first_name", self.first_name.clone().into()),
            ("last_name", self.last_name.clone().into()),
            ("cjppu_number", self.cjppu_number.clone().into()),
            ("profession_number", self.profession_number.clone().into()),
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
pub struct MapRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct HealthServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct MedicalRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub cjppu_number: String,
    #[serde(default)]
    pub profession_number: String,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
}
