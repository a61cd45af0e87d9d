//! Community recipes, votes, and attached photos

use chrono::Utc;
use common::store::{DEFAULTED, Filter, Order};
use uuid::Uuid;

use super::media::MediaService;
use super::{ensure_owner, fetch, requester, upsert};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::media::{Media, UploadedFile};
use crate::models::recipe::{Recipe, RecipeDetail, RecipeMedia, RecipeRequest, RecipeVote, VoteResponse};
use crate::repositories::Repositories;
use crate::validation::{require, validate_level};

#[derive(Clone)]
pub struct RecipeService {
    repos: Repositories,
    media: MediaService,
}

impl RecipeService {
    pub fn new(repos: Repositories, media: MediaService) -> Self {
        Self { repos, media }
    }

    pub async fn create(&self, caller: &AuthUser, req: RecipeRequest) -> ApiResult<Recipe> {
        require("Title", &req.title).map_err(ApiError::BadRequest)?;
        let user = requester(&self.repos, caller).await?;

        let recipe = Recipe {
            id: 0,
            uuid: Uuid::nil(),
            user_id: user.id,
            title: req.title.trim().to_string(),
            description: req.description,
            ingredients: req.ingredients,
            preparation: req.preparation,
            created_at: Utc::now(),
        };

        Ok(self.repos.recipes.create_with_omit(DEFAULTED, recipe).await?)
    }

    pub async fn list(&self) -> ApiResult<Vec<Recipe>> {
        Ok(self
            .repos
            .recipes
            .find(Filter::new().order_by("created_at", Order::Desc))
            .await?)
    }

    /// Recipe with its vote tally and photos
    pub async fn get(&self, uuid: Uuid) -> ApiResult<RecipeDetail> {
        let recipe = fetch(&self.repos.recipes, uuid, "Recipe").await?;

        let votes = self
            .repos
            .recipe_votes
            .find(Filter::new().eq("recipe_id", recipe.id))
            .await?;
        let average = (!votes.is_empty())
            .then(|| votes.iter().map(|v| v.level as f64).sum::<f64>() / votes.len() as f64);

        let media = self
            .media
            .linked(&self.repos.recipe_media, "recipe_id", recipe.id, |l: &RecipeMedia| l.media_id)
            .await?;

        Ok(RecipeDetail {
            recipe,
            votes: votes.len(),
            average,
            media,
        })
    }

    async fn owned(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<Recipe> {
        let user = requester(&self.repos, caller).await?;
        let recipe = fetch(&self.repos.recipes, uuid, "Recipe").await?;
        ensure_owner(recipe.user_id, &user)?;
        Ok(recipe)
    }

    pub async fn update(&self, caller: &AuthUser, uuid: Uuid, req: RecipeRequest) -> ApiResult<Recipe> {
        require("Title", &req.title).map_err(ApiError::BadRequest)?;

        let mut recipe = self.owned(caller, uuid).await?;
        recipe.title = req.title.trim().to_string();
        recipe.description = req.description;
        recipe.ingredients = req.ingredients;
        recipe.preparation = req.preparation;

        Ok(self.repos.recipes.update(&recipe).await?)
    }

    pub async fn delete(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<()> {
        let recipe = self.owned(caller, uuid).await?;
        self.repos.recipes.delete(&recipe).await?;
        Ok(())
    }

    /// One vote per user and recipe; voting again replaces the level
    pub async fn vote(&self, caller: &AuthUser, uuid: Uuid, level: i32) -> ApiResult<VoteResponse> {
        validate_level(level).map_err(ApiError::BadRequest)?;
        let user = requester(&self.repos, caller).await?;
        let recipe = fetch(&self.repos.recipes, uuid, "Recipe").await?;

        let fresh = RecipeVote {
            id: 0,
            user_id: user.id,
            recipe_id: recipe.id,
            level,
            created_at: Utc::now(),
        };
        let lookup = Filter::new()
            .eq("user_id", user.id)
            .eq("recipe_id", recipe.id);

        let vote = upsert(&self.repos.recipe_votes, lookup, fresh, |v| v.level = level).await?;

        Ok(VoteResponse {
            recipe: recipe.uuid,
            level: vote.level,
        })
    }

    pub async fn attach_media(&self, caller: &AuthUser, uuid: Uuid, file: UploadedFile) -> ApiResult<Media> {
        let recipe = self.owned(caller, uuid).await?;
        let media = self.media.store(file).await?;

        self.repos
            .recipe_media
            .create_with_omit(DEFAULTED, RecipeMedia::new(recipe.id, media.id))
            .await?;
        Ok(media)
    }
}
