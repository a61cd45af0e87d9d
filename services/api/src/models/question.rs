use chrono::{DateTime, Utc};
use common::store::{Entity, SqlValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Question {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Question {
    const TABLE: &'static str = "questions";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("user_id", self.user_id.into()),
            ("title", self.title.clone().into()),
            ("content", self.content.clone().into()),
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

/// Always belongs to a question
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Answer {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    #[serde(skip)]
    pub user_id: i64,
    #[serde(skip)]
    pub question_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Answer {
    const TABLE: &'static str = "answers";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("user_id", self.user_id.into()),
            ("question_id", self.question_id.into()),
            ("content", self.content.clone().into()),
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
pub struct QuestionRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<Answer>,
}
