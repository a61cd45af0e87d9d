//! Recipe routes

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use super::media::file_part;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::media::Media;
use crate::models::recipe::{Recipe, RecipeDetail, RecipeRequest, VoteRequest, VoteResponse};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(create_recipe).get(list_recipes))
        .route(
            "/recipes/:uuid",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/:uuid/vote", post(vote_recipe))
        .route("/recipes/:uuid/media", post(attach_media))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<RecipeRequest>,
) -> ApiResult<ApiResponse<Recipe>> {
    let recipe = state
        .services
        .recipes
        .create(&caller, payload)
        .await
        .map_err(|e| e.logged("Failed to create recipe"))?;

    Ok(ApiResponse::ok("Recipe created", recipe))
}

pub async fn list_recipes(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Recipe>>> {
    let recipes = state
        .services
        .recipes
        .list()
        .await
        .map_err(|e| e.logged("Failed to list recipes"))?;

    Ok(ApiResponse::ok("Recipes", recipes))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<RecipeDetail>> {
    let recipe = state
        .services
        .recipes
        .get(uuid)
        .await
        .map_err(|e| e.logged("Failed to load recipe"))?;

    Ok(ApiResponse::ok("Recipe", recipe))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<RecipeRequest>,
) -> ApiResult<ApiResponse<Recipe>> {
    let recipe = state
        .services
        .recipes
        .update(&caller, uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to update recipe"))?;

    Ok(ApiResponse::ok("Recipe updated", recipe))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .recipes
        .delete(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to delete recipe"))?;

    Ok(ApiResponse::message("Recipe deleted"))
}

pub async fn vote_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> ApiResult<ApiResponse<VoteResponse>> {
    let vote = state
        .services
        .recipes
        .vote(&caller, uuid, payload.level)
        .await
        .map_err(|e| e.logged("Failed to vote"))?;

    Ok(ApiResponse::ok("Vote recorded", vote))
}

pub async fn attach_media(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<ApiResponse<Media>> {
    let file = file_part(multipart)
        .await
        .map_err(|e| e.logged("Failed to read upload"))?;
    let media = state
        .services
        .recipes
        .attach_media(&caller, uuid, file)
        .await
        .map_err(|e| e.logged("Failed to attach media"))?;

    Ok(ApiResponse::ok("Media attached", media))
}

#[cfg(test)]
mod tests {
    use crate::routes::media::tests::multipart_request;
    use crate::routes::test_support::*;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn vote_upsert_and_photo_upload() {
        let state = AppState::in_memory();
        let ana = token_for(&state, "ana@example.com", false).await;

        let create = json_request(
            "POST",
            "/api/v1/recipes",
            Some(&ana),
            json!({ "title": "Pumpkin soup", "ingredients": "pumpkin" }),
        );
        let body = body_json(send(&state, create).await).await;
        let uuid = body["data"]["uuid"].as_str().unwrap().to_string();
        let vote_uri = format!("/api/v1/recipes/{}/vote", uuid);

        let bad = json_request("POST", &vote_uri, Some(&ana), json!({ "level": 9 }));
        assert_eq!(send(&state, bad).await.status(), StatusCode::BAD_REQUEST);

        for level in [2, 4] {
            let vote = json_request("POST", &vote_uri, Some(&ana), json!({ "level": level }));
            assert_eq!(send(&state, vote).await.status(), StatusCode::OK);
        }

        let upload = multipart_request(
            &format!("/api/v1/recipes/{}/media", uuid),
            &ana,
            &[],
            Some("soup.png"),
        );
        assert_eq!(send(&state, upload).await.status(), StatusCode::OK);

        let detail = empty_request("GET", &format!("/api/v1/recipes/{}", uuid), Some(&ana));
        let body = body_json(send(&state, detail).await).await;
        assert_eq!(body["data"]["votes"], 1);
        assert_eq!(body["data"]["average"], 4.0);
        assert_eq!(body["data"]["title"], "Pumpkin soup");
        assert_eq!(body["data"]["media"].as_array().unwrap().len(), 1);
    }
}
