//! Articles, categories, and their join rows

use chrono::{DateTime, Utc};
use common::store::{Entity, SqlValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::media::{Media, UploadedFile};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Article {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Article {
    const TABLE: &'static str = "articles";

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

/// Flat tag
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["name"]];

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("name", self.name.clone().into()),
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

super::join_entity!(ArticleCategory, "article_categories", article_id, category_id);
super::join_entity!(ArticleMedia, "article_media", article_id, media_id);

/// Parsed multipart body of `POST /articles`
#[derive(Debug, Default)]
pub struct CreateArticleForm {
    pub title: String,
    pub content: String,
    pub file: Option<UploadedFile>,
    /// Category uuids
    pub categories: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub category: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    pub categories: Vec<Category>,
    pub media: Vec<Media>,
}
