//! Symptom catalog, tracking, and daily monitoring routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::symptom::{
    CreateMonitoringRequest, MonitoringQuery, MonitoringResponse, Symptom, SymptomQuery, SymptomRequest,
};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/symptoms", get(list_symptoms))
        .route("/symptoms/tracked", get(tracked_symptoms))
        .route("/symptoms/:uuid", get(get_symptom))
        .route("/symptoms/:uuid/track", post(track_symptom).delete(untrack_symptom))
        .route("/monitorings", post(create_monitoring).get(list_monitorings))
        .route("/monitorings/:uuid", delete(delete_monitoring))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/symptoms", post(create_symptom))
        .route("/symptoms/:uuid", put(update_symptom).delete(delete_symptom))
}

pub async fn list_symptoms(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<SymptomQuery>,
) -> ApiResult<ApiResponse<Vec<Symptom>>> {
    let symptoms = state
        .services
        .symptoms
        .list(&caller, query.all)
        .await
        .map_err(|e| e.logged("Failed to list symptoms"))?;

    Ok(ApiResponse::ok("Symptoms", symptoms))
}

pub async fn get_symptom(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<Symptom>> {
    let symptom = state
        .services
        .symptoms
        .get(uuid)
        .await
        .map_err(|e| e.logged("Failed to load symptom"))?;

    Ok(ApiResponse::ok("Symptom", symptom))
}

pub async fn create_symptom(
    State(state): State<AppState>,
    Json(payload): Json<SymptomRequest>,
) -> ApiResult<ApiResponse<Symptom>> {
    let symptom = state
        .services
        .symptoms
        .create(payload)
        .await
        .map_err(|e| e.logged("Failed to create symptom"))?;

    Ok(ApiResponse::ok("Symptom created", symptom))
}

pub async fn update_symptom(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<SymptomRequest>,
) -> ApiResult<ApiResponse<Symptom>> {
    let symptom = state
        .services
        .symptoms
        .update(uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to update symptom"))?;

    Ok(ApiResponse::ok("Symptom updated", symptom))
}

pub async fn delete_symptom(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .symptoms
        .delete(uuid)
        .await
        .map_err(|e| e.logged("Failed to delete symptom"))?;

    Ok(ApiResponse::message("Symptom deleted"))
}

pub async fn tracked_symptoms(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<ApiResponse<Vec<Symptom>>> {
    let symptoms = state
        .services
        .symptoms
        .tracked(&caller)
        .await
        .map_err(|e| e.logged("Failed to list tracked symptoms"))?;

    Ok(ApiResponse::ok("Tracked symptoms", symptoms))
}

pub async fn track_symptom(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<Symptom>> {
    let symptom = state
        .services
        .symptoms
        .track(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to track symptom"))?;

    Ok(ApiResponse::ok("Symptom tracked", symptom))
}

pub async fn untrack_symptom(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .symptoms
        .untrack(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to untrack symptom"))?;

    Ok(ApiResponse::message("Symptom untracked"))
}

pub async fn create_monitoring(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<CreateMonitoringRequest>,
) -> ApiResult<ApiResponse<MonitoringResponse>> {
    let monitoring = state
        .services
        .monitorings
        .create(&caller, payload)
        .await
        .map_err(|e| e.logged("Failed to create monitoring"))?;

    Ok(ApiResponse::ok("Monitoring created", monitoring))
}

pub async fn list_monitorings(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<MonitoringQuery>,
) -> ApiResult<ApiResponse<Vec<MonitoringResponse>>> {
    let monitorings = state
        .services
        .monitorings
        .list(&caller, query.symptom)
        .await
        .map_err(|e| e.logged("Failed to list monitorings"))?;

    Ok(ApiResponse::ok("Monitorings", monitorings))
}

pub async fn delete_monitoring(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .monitorings
        .delete(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to delete monitoring"))?;

    Ok(ApiResponse::message("Monitoring deleted"))
}
