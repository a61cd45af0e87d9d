//! Article and category routes

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use super::media::article_form;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::article::{AddCategoryRequest, Article, ArticleDetail, Category, CategoryRequest};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", post(create_article).get(list_articles))
        .route("/articles/:uuid", get(get_article).delete(delete_article))
        .route("/articles/:uuid/categories", post(add_category))
        .route("/articles/:uuid/media/:media_uuid", delete(detach_media))
        .route("/categories", get(list_categories))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route("/categories/:uuid", delete(delete_category))
}

pub async fn create_article(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<ApiResponse<ArticleDetail>> {
    let form = article_form(multipart)
        .await
        .map_err(|e| e.logged("Failed to read article form"))?;
    let article = state
        .services
        .articles
        .create(&caller, form)
        .await
        .map_err(|e| e.logged("Failed to create article"))?;

    Ok(ApiResponse::ok("Article created", article))
}

pub async fn list_articles(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Article>>> {
    let articles = state
        .services
        .articles
        .list()
        .await
        .map_err(|e| e.logged("Failed to list articles"))?;

    Ok(ApiResponse::ok("Articles", articles))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<ArticleDetail>> {
    let article = state
        .services
        .articles
        .get(uuid)
        .await
        .map_err(|e| e.logged("Failed to load article"))?;

    Ok(ApiResponse::ok("Article", article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .articles
        .delete(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to delete article"))?;

    Ok(ApiResponse::message("Article deleted"))
}

pub async fn add_category(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<AddCategoryRequest>,
) -> ApiResult<ApiResponse<Category>> {
    let category = state
        .services
        .articles
        .add_category(&caller, uuid, payload.category)
        .await
        .map_err(|e| e.logged("Failed to add category"))?;

    Ok(ApiResponse::ok("Category added", category))
}

pub async fn detach_media(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path((uuid, media_uuid)): Path<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .articles
        .detach_media(&caller, uuid, media_uuid)
        .await
        .map_err(|e| e.logged("Failed to detach media"))?;

    Ok(ApiResponse::message("Media detached"))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Category>>> {
    let categories = state
        .services
        .categories
        .list()
        .await
        .map_err(|e| e.logged("Failed to list categories"))?;

    Ok(ApiResponse::ok("Categories", categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> ApiResult<ApiResponse<Category>> {
    let category = state
        .services
        .categories
        .create(&payload.name)
        .await
        .map_err(|e| e.logged("Failed to create category"))?;

    Ok(ApiResponse::ok("Category created", category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .categories
        .delete(uuid)
        .await
        .map_err(|e| e.logged("Failed to delete category"))?;

    Ok(ApiResponse::message("Category deleted"))
}

#[cfg(test)]
mod tests {
    use crate::routes::media::tests::multipart_request;
    use crate::routes::test_support::*;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn multipart_article_with_category_and_file() {
        let state = AppState::in_memory();
        let admin = token_for(&state, "root@example.com", true).await;
        let ana = token_for(&state, "ana@example.com", false).await;

        let create = json_request("POST", "/api/v1/categories", Some(&admin), json!({ "name": "Diet" }));
        let body = body_json(send(&state, create).await).await;
        let category = body["data"]["uuid"].as_str().unwrap().to_string();

        let request = multipart_request(
            "/api/v1/articles",
            &ana,
            &[
                ("title", "Hydration"),
                ("content", "Drink water"),
                ("category", category.as_str()),
            ],
            Some("cover.png"),
        );
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["title"], "Hydration");
        assert_eq!(body["data"]["categories"][0]["name"], "Diet");
        assert_eq!(body["data"]["media"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn categories_are_admin_only_to_create() {
        let state = AppState::in_memory();
        let ana = token_for(&state, "ana@example.com", false).await;

        let create = json_request("POST", "/api/v1/categories", Some(&ana), json!({ "name": "Diet" }));
        assert_eq!(send(&state, create).await.status(), StatusCode::FORBIDDEN);

        let list = empty_request("GET", "/api/v1/categories", Some(&ana));
        assert_eq!(send(&state, list).await.status(), StatusCode::OK);
    }
}
