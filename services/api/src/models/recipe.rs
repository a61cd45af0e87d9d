//! Recipes and their votes

use chrono::{DateTime, Utc};
use common::store::{Entity, SqlValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::media::Media;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub preparation: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Recipe {
    const TABLE: &'static str = "recipes";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("user_id", self.user_id.into()),
            ("title", self.title.clone().into()),
            ("description", self.description.clone().into()),
            ("ingredients", self.ingredients.clone().into()),
            ("preparation", self.preparation.clone().into()),
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

/// A user's 1..=5 vote on a recipe; one per (user, recipe)
#[derive(Debug, Clone, FromRow)]
pub struct RecipeVote {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub level: i32,
    pub created_at: DateTime<Utc>,
}

impl Entity for RecipeVote {
    const TABLE: &'static str = "recipe_votes";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["user_id", "recipe_id"]];

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", self.user_id.into()),
            ("recipe_id", self.recipe_id.into()),
            ("level", self.level.into()),
            ("created_at", self.created_at.into()),
        ]
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn assign_default(&mut self, column: &str, now: DateTime<Utc>) {
        if column == "created_at" {
            self.created_at = now;
        }
    }
}

super::join_entity!(RecipeMedia, "recipe_media", recipe_id, media_id);

#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub preparation: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub level: i32,
}

/// Recipe with its vote tally and attachments
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub votes: usize,
    pub average: Option<f64>,
    pub media: Vec<Media>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub recipe: Uuid,
    pub level: i32,
}
