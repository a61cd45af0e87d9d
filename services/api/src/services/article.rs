//! Articles, their categories, and attached media

use chrono::Utc;
use common::store::{DEFAULTED, Filter, Order};
use tracing::info;
use uuid::Uuid;

use super::media::MediaService;
use super::{ensure_owner_or_admin, fetch, requester};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::article::{
    Article, ArticleCategory, ArticleDetail, ArticleMedia, Category, CreateArticleForm,
};
use crate::repositories::Repositories;
use crate::validation::require;

#[derive(Clone)]
pub struct ArticleService {
    repos: Repositories,
    media: MediaService,
}

impl ArticleService {
    pub fn new(repos: Repositories, media: MediaService) -> Self {
        Self { repos, media }
    }

    /// Publish an article with its categories and optional file
    pub async fn create(&self, caller: &AuthUser, form: CreateArticleForm) -> ApiResult<ArticleDetail> {
        require("Title", &form.title).map_err(ApiError::BadRequest)?;
        require("Content", &form.content).map_err(ApiError::BadRequest)?;
        let user = requester(&self.repos, caller).await?;

        let mut categories: Vec<Category> = Vec::with_capacity(form.categories.len());
        for uuid in form.categories {
            let category = fetch(&self.repos.categories, uuid, "Category").await?;
            if !categories.iter().any(|c| c.id == category.id) {
                categories.push(category);
            }
        }

        let stored = match form.file {
            Some(file) => Some(self.media.store(file).await?),
            None => None,
        };

        let article = Article {
            id: 0,
            uuid: Uuid::nil(),
            user_id: user.id,
            title: form.title.trim().to_string(),
            content: form.content,
            created_at: Utc::now(),
        };
        let article = self.repos.articles.create_with_omit(DEFAULTED, article).await?;

        if !categories.is_empty() {
            let links = categories
                .iter()
                .map(|c| ArticleCategory::new(article.id, c.id))
                .collect();
            self.repos.article_categories.create_many(DEFAULTED, links).await?;
        }

        let mut media = Vec::new();
        if let Some(stored) = stored {
            self.repos
                .article_media
                .create_with_omit(DEFAULTED, ArticleMedia::new(article.id, stored.id))
                .await?;
            media.push(stored);
        }

        info!("User {} published article {}", user.uuid, article.uuid);
        Ok(ArticleDetail {
            article,
            categories,
            media,
        })
    }

    pub async fn list(&self) -> ApiResult<Vec<Article>> {
        Ok(self
            .repos
            .articles
            .find(Filter::new().order_by("created_at", Order::Desc))
            .await?)
    }

    pub async fn get(&self, uuid: Uuid) -> ApiResult<ArticleDetail> {
        let article = fetch(&self.repos.articles, uuid, "Article").await?;

        let links = self
            .repos
            .article_categories
            .find(Filter::new().eq("article_id", article.id))
            .await?;
        let mut categories = Vec::with_capacity(links.len());
        for link in links {
            if let Some(category) = self
                .repos
                .categories
                .first(Filter::new().eq("id", link.category_id))
                .await?
            {
                categories.push(category);
            }
        }

        let media = self
            .media
            .linked(&self.repos.article_media, "article_id", article.id, |l: &ArticleMedia| l.media_id)
            .await?;

        Ok(ArticleDetail {
            article,
            categories,
            media,
        })
    }

    async fn editable(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<Article> {
        let user = requester(&self.repos, caller).await?;
        let article = fetch(&self.repos.articles, uuid, "Article").await?;
        ensure_owner_or_admin(article.user_id, &user)?;
        Ok(article)
    }

    pub async fn delete(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<()> {
        let article = self.editable(caller, uuid).await?;
        self.repos.articles.delete(&article).await?;
        Ok(())
    }

    pub async fn add_category(&self, caller: &AuthUser, uuid: Uuid, category: Uuid) -> ApiResult<Category> {
        let article = self.editable(caller, uuid).await?;
        let category = fetch(&self.repos.categories, category, "Category").await?;

        let existing = self
            .repos
            .article_categories
            .find_item_by_ids("article_id", article.id, "category_id", category.id)
            .await?;
        if existing.is_some() {
            return Err(ApiError::bad_request("Article already has this category"));
        }

        self.repos
            .article_categories
            .create_with_omit(DEFAULTED, ArticleCategory::new(article.id, category.id))
            .await?;
        Ok(category)
    }

    /// Unlink a media item; the stored object and its row are kept
    pub async fn detach_media(&self, caller: &AuthUser, uuid: Uuid, media: Uuid) -> ApiResult<()> {
        let article = self.editable(caller, uuid).await?;
        let media = fetch(&self.repos.media, media, "Media").await?;

        let link = self
            .repos
            .article_media
            .find_item_by_ids("article_id", article.id, "media_id", media.id)
            .await?
            .ok_or_else(|| ApiError::not_found("Media is not attached to this article"))?;

        self.repos.article_media.delete(&link).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct CategoryService {
    repos: Repositories,
}

impl CategoryService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ApiResult<Vec<Category>> {
        Ok(self
            .repos
            .categories
            .find(Filter::new().order_by("name", Order::Asc))
            .await?)
    }

    pub async fn create(&self, name: &str) -> ApiResult<Category> {
        require("Name", name).map_err(ApiError::BadRequest)?;

        let category = Category {
            id: 0,
            uuid: Uuid::nil(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };

        self.repos
            .categories
            .create_with_omit(DEFAULTED, category)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ApiError::Conflict("Category already exists".to_string())
                } else {
                    e.into()
                }
            })
    }

    pub async fn delete(&self, uuid: Uuid) -> ApiResult<()> {
        let category = fetch(&self.repos.categories, uuid, "Category").await?;
        self.repos.categories.delete(&category).await?;
        Ok(())
    }
}
