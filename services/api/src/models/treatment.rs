//! Treatments and medical records

use chrono::{DateTime, NaiveDate, Utc};
use common::store::{Entity, SqlValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// When a treatment is taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    pub day: String,
    #[serde(default)]
    pub times: Vec<String>,
}

/// A dose that is part of a treatment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub name: String,
    pub dose: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Treatment {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    #[serde(skip)]
    pub user_id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    #[sqlx(json)]
    pub frequency: Vec<Frequency>,
    #[sqlx(json)]
    pub shots: Vec<Shot>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Treatment {
    const TABLE: &'static str = "treatments";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("user_id", self.user_id.into()),
            ("name", self.name.clone().into()),
            ("start_date", self.start_date.into()),
            ("frequency", serde_json::json!(self.frequency).into()),
            ("shots", serde_json::json!(self.shots).into()),
            ("notes", self.notes.clone().into()),
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
pub struct TreatmentRequest {
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub frequency: Vec<Frequency>,
    #[serde(default)]
    pub shots: Vec<Shot>,
    pub notes: Option<String>,
}

/// Health-profile answers, one row per user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MedicalRecord {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    #[serde(skip)]
    pub user_id: i64,
    pub disability: Option<String>,
    pub comorbidity: Option<String>,
    pub support_network: Option<String>,
    pub diagnosis_year: Option<i32>,
    pub uses_medication: bool,
    pub medication_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for MedicalRecord {
    const TABLE: &'static str = "medical_records";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["user_id"]];

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("user_id", self.user_id.into()),
            ("disability", self.disability.clone().into()),
            ("comorbidity", self.comorbidity.clone().into()),
            ("support_network", self.support_network.clone().into()),
            ("diagnosis_year", self.diagnosis_year.into()),
            ("uses_medication", self.uses_medication.into()),
            ("medication_notes", self.medication_notes.clone().into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
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
pub struct MedicalRecordRequest {
    pub disability: Option<String>,
    pub comorbidity: Option<String>,
    pub support_network: Option<String>,
    pub diagnosis_year: Option<i32>,
    #[serde(default)]
    pub uses_medication: bool,
    pub medication_notes: Option<String>,
}
