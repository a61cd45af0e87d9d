//! Reminder routes, including ratings of catalog entries

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
use crate::models::reminder::{RatingRequest, RatingResponse, Reminder, ReminderDetail, ReminderRequest};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/reminders", post(create_reminder).get(list_reminders))
        .route(
            "/reminders/:uuid",
            get(get_reminder).put(update_reminder).delete(delete_reminder),
        )
        .route("/reminders/:uuid/media", post(attach_media))
        .route("/reminders/:uuid/ratings/maps", post(rate_map))
        .route("/reminders/:uuid/ratings/healthservices", post(rate_health_service))
        .route("/reminders/:uuid/ratings/medicals", post(rate_medical))
}

pub async fn create_reminder(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<ReminderRequest>,
) -> ApiResult<ApiResponse<Reminder>> {
    let reminder = state
        .services
        .reminders
        .create(&caller, payload)
        .await
        .map_err(|e| e.logged("Failed to create reminder"))?;

    Ok(ApiResponse::ok("Reminder created", reminder))
}

pub async fn list_reminders(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<ApiResponse<Vec<Reminder>>> {
    let reminders = state
        .services
        .reminders
        .list(&caller)
        .await
        .map_err(|e| e.logged("Failed to list reminders"))?;

    Ok(ApiResponse::ok("Reminders", reminders))
}

pub async fn get_reminder(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<ReminderDetail>> {
    let reminder = state
        .services
        .reminders
        .get(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to load reminder"))?;

    Ok(ApiResponse::ok("Reminder", reminder))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<ReminderRequest>,
) -> ApiResult<ApiResponse<Reminder>> {
    let reminder = state
        .services
        .reminders
        .update(&caller, uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to update reminder"))?;

    Ok(ApiResponse::ok("Reminder updated", reminder))
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .reminders
        .delete(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to delete reminder"))?;

    Ok(ApiResponse::message("Reminder deleted"))
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
        .reminders
        .attach_media(&caller, uuid, file)
        .await
        .map_err(|e| e.logged("Failed to attach media"))?;

    Ok(ApiResponse::ok("Media attached", media))
}

pub async fn rate_map(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<RatingRequest>,
) -> ApiResult<ApiResponse<RatingResponse>> {
    let rating = state
        .services
        .reminders
        .rate_map(&caller, uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to rate map"))?;

    Ok(ApiResponse::ok("Rating recorded", rating))
}

pub async fn rate_health_service(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<RatingRequest>,
) -> ApiResult<ApiResponse<RatingResponse>> {
    let rating = state
        .services
        .reminders
        .rate_health_service(&caller, uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to rate health service"))?;

    Ok(ApiResponse::ok("Rating recorded", rating))
}

pub async fn rate_medical(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<RatingRequest>,
) -> ApiResult<ApiResponse<RatingResponse>> {
    let rating = state
        .services
        .reminders
        .rate_medical(&caller, uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to rate medical"))?;

    Ok(ApiResponse::ok("Rating recorded", rating))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn rating_a_map_from_someone_elses_reminder_is_403() {
        let state = AppState::in_memory();
        let admin = token_for(&state, "root@example.com", true).await;
        let ana = token_for(&state, "ana@example.com", false).await;
        let bia = token_for(&state, "bia@example.com", false).await;

        let map = json_request(
            "POST",
            "/api/v1/maps",
            Some(&admin),
            json!({ "name": "Pharmacy", "latitude": 48.85, "longitude": 2.35 }),
        );
        let body = body_json(send(&state, map).await).await;
        let map_uuid = body["data"]["uuid"].as_str().unwrap().to_string();

        let reminder = json_request(
            "POST",
            "/api/v1/reminders",
            Some(&ana),
            json!({ "title": "Pick up meds", "remind_at": "2030-01-01T09:00:00Z" }),
        );
        let body = body_json(send(&state, reminder).await).await;
        let reminder_uuid = body["data"]["uuid"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/reminders/{}/ratings/maps", reminder_uuid);

        let stranger = json_request("POST", &uri, Some(&bia), json!({ "target": map_uuid, "level": 3 }));
        assert_eq!(send(&state, stranger).await.status(), StatusCode::FORBIDDEN);

        let owner = json_request("POST", &uri, Some(&ana), json!({ "target": map_uuid, "level": 3 }));
        let response = send(&state, owner).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["level"], 3);

        let missing = json_request(
            "POST",
            &uri,
            Some(&ana),
            json!({ "target": "00000000-0000-4000-8000-000000000000", "level": 3 }),
        );
        assert_eq!(send(&state, missing).await.status(), StatusCode::NOT_FOUND);
    }
}
