//! Treatment plan and medical record routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::treatment::{MedicalRecord, MedicalRecordRequest, Treatment, TreatmentRequest};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/treatments", post(create_treatment).get(list_treatments))
        .route(
            "/treatments/:uuid",
            get(get_treatment).put(update_treatment).delete(delete_treatment),
        )
        .route("/medicalrecords", post(create_record))
        .route("/medicalrecords/me", get(my_record))
        .route("/medicalrecords/:uuid", put(update_record))
}

pub async fn create_treatment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<TreatmentRequest>,
) -> ApiResult<ApiResponse<Treatment>> {
    let treatment = state
        .services
        .treatments
        .create(&caller, payload)
        .await
        .map_err(|e| e.logged("Failed to create treatment"))?;

    Ok(ApiResponse::ok("Treatment created", treatment))
}

pub async fn list_treatments(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<ApiResponse<Vec<Treatment>>> {
    let treatments = state
        .services
        .treatments
        .list(&caller)
        .await
        .map_err(|e| e.logged("Failed to list treatments"))?;

    Ok(ApiResponse::ok("Treatments", treatments))
}

pub async fn get_treatment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<Treatment>> {
    let treatment = state
        .services
        .treatments
        .get(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to load treatment"))?;

    Ok(ApiResponse::ok("Treatment", treatment))
}

pub async fn update_treatment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<TreatmentRequest>,
) -> ApiResult<ApiResponse<Treatment>> {
    let treatment = state
        .services
        .treatments
        .update(&caller, uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to update treatment"))?;

    Ok(ApiResponse::ok("Treatment updated", treatment))
}

pub async fn delete_treatment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .treatments
        .delete(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to delete treatment"))?;

    Ok(ApiResponse::message("Treatment deleted"))
}

pub async fn create_record(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<MedicalRecordRequest>,
) -> ApiResult<ApiResponse<MedicalRecord>> {
    let record = state
        .services
        .medical_records
        .create(&caller, payload)
        .await
        .map_err(|e| e.logged("Failed to create medical record"))?;

    Ok(ApiResponse::ok("Medical record created", record))
}

pub async fn my_record(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<ApiResponse<MedicalRecord>> {
    let record = state
        .services
        .medical_records
        .mine(&caller)
        .await
        .map_err(|e| e.logged("Failed to load medical record"))?;

    Ok(ApiResponse::ok("Medical record", record))
}

pub async fn update_record(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<MedicalRecordRequest>,
) -> ApiResult<ApiResponse<MedicalRecord>> {
    let record = state
        .services
        .medical_records
        .update(&caller, uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to update medical record"))?;

    Ok(ApiResponse::ok("Medical record updated", record))
}
