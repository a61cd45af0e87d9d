//! Map, health service and medical directory routes

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use super::media::file_part;
use crate::error::ApiResult;
use crate::models::catalog::{
    HealthService, HealthServiceRequest, ImportSummary, Map, MapRequest, Medical, MedicalRequest,
};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/maps", get(list_maps))
        .route("/healthservices", get(list_health_services))
        .route("/medicals", get(list_medicals))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/maps", post(create_map))
        .route("/maps/:uuid", put(update_map).delete(delete_map))
        .route("/healthservices", post(create_health_service))
        .route(
            "/healthservices/:uuid",
            put(update_health_service).delete(delete_health_service),
        )
        .route("/medicals", post(create_medical))
        .route("/medicals/:uuid", delete(delete_medical))
        .route("/medicals/import", post(import_medicals))
}

pub async fn list_maps(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Map>>> {
    let maps = state
        .services
        .maps
        .list()
        .await
        .map_err(|e| e.logged("Failed to list maps"))?;

    Ok(ApiResponse::ok("Maps", maps))
}

pub async fn create_map(
    State(state): State<AppState>,
    Json(payload): Json<MapRequest>,
) -> ApiResult<ApiResponse<Map>> {
    let map = state
        .services
        .maps
        .create(payload)
        .await
        .map_err(|e| e.logged("Failed to create map"))?;

    Ok(ApiResponse::ok("Map created", map))
}

pub async fn update_map(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<MapRequest>,
) -> ApiResult<ApiResponse<Map>> {
    let map = state
        .services
        .maps
        .update(uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to update map"))?;

    Ok(ApiResponse::ok("Map updated", map))
}

pub async fn delete_map(State(state): State<AppState>, Path(uuid): Path<Uuid>) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .maps
        .delete(uuid)
        .await
        .map_err(|e| e.logged("Failed to delete map"))?;

    Ok(ApiResponse::message("Map deleted"))
}

pub async fn list_health_services(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<HealthService>>> {
    let services = state
        .services
        .health_services
        .list()
        .await
        .map_err(|e| e.logged("Failed to list health services"))?;

    Ok(ApiResponse::ok("Health services", services))
}

pub async fn create_health_service(
    State(state): State<AppState>,
    Json(payload): Json<HealthServiceRequest>,
) -> ApiResult<ApiResponse<HealthService>> {
    let service = state
        .services
        .health_services
        .create(payload)
        .await
        .map_err(|e| e.logged("Failed to create health service"))?;

    Ok(ApiResponse::ok("Health service created", service))
}

pub async fn update_health_service(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<HealthServiceRequest>,
) -> ApiResult<ApiResponse<HealthService>> {
    let service = state
        .services
        .health_services
        .update(uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to update health service"))?;

    Ok(ApiResponse::ok("Health service updated", service))
}

pub async fn delete_health_service(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .health_services
        .delete(uuid)
        .await
        .map_err(|e| e.logged("Failed to delete health service"))?;

    Ok(ApiResponse::message("Health service deleted"))
}

pub async fn list_medicals(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Medical>>> {
    let medicals = state
        .services
        .medicals
        .list()
        .await
        .map_err(|e| e.logged("Failed to list medicals"))?;

    Ok(ApiResponse::ok("Medicals", medicals))
}

pub async fn create_medical(
    State(state): State<AppState>,
    Json(payload): Json<MedicalRequest>,
) -> ApiResult<ApiResponse<Medical>> {
    let medical = state
        .services
        .medicals
        .create(payload)
        .await
        .map_err(|e| e.logged("Failed to create medical"))?;

    Ok(ApiResponse::ok("Medical created", medical))
}

pub async fn delete_medical(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .medicals
        .delete(uuid)
        .await
        .map_err(|e| e.logged("Failed to delete medical"))?;

    Ok(ApiResponse::message("Medical deleted"))
}

/// Bulk load from a registry export uploaded as the `file` part
pub async fn import_medicals(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<ApiResponse<ImportSummary>> {
    let file = file_part(multipart)
        .await
        .map_err(|e| e.logged("Failed to read registry upload"))?;
    let summary = state
        .services
        .medicals
        .import(&file.bytes)
        .await
        .map_err(|e| e.logged("Failed to import medicals"))?;

    Ok(ApiResponse::ok("Medicals imported", summary))
}

#[cfg(test)]
mod tests {
    use crate::routes::media::tests::{file_upload_request, multipart_request};
    use crate::routes::test_support::*;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn out_of_range_coordinates_are_rejected() {
        let state = AppState::in_memory();
        let admin = token_for(&state, "root@example.com", true).await;

        let request = json_request(
            "POST",
            "/api/v1/maps",
            Some(&admin),
            json!({ "name": "Nowhere", "latitude": 120.0, "longitude": 0.0 }),
        );
        assert_eq!(send(&state, request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn members_read_admins_write() {
        let state = AppState::in_memory();
        let ana = token_for(&state, "ana@example.com", false).await;

        let list = empty_request("GET", "/api/v1/medicals", Some(&ana));
        assert_eq!(send(&state, list).await.status(), StatusCode::OK);

        let create = json_request(
            "POST",
            "/api/v1/medicals",
            Some(&ana),
            json!({ "first_name": "Jean", "last_name": "Dupont" }),
        );
        assert_eq!(send(&state, create).await.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn import_without_file_is_400() {
        let state = AppState::in_memory();
        let admin = token_for(&state, "root@example.com", true).await;

        let request = multipart_request("/api/v1/medicals/import", &admin, &[("note", "x")], None);
        assert_eq!(send(&state, request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn registry_upload_imports_every_row() {
        let state = AppState::in_memory();
        let admin = token_for(&state, "root@example.com", true).await;

        // "Araújo" as Latin-1
        let mut registry = b"Nome;Sexo;Sobrenome;UF;CJPPU;Registro\n Joana ;F; Lima ;PE; 111 ;CRM-1\nCaio;M;Ara".to_vec();
        registry.push(0xFA);
        registry.extend_from_slice(b"jo;SP;222;CRM-2\n");

        let request = file_upload_request("/api/v1/medicals/import", &admin, "registry.csv", "text/csv", &registry);
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["imported"], 2);

        let list = empty_request("GET", "/api/v1/medicals", Some(&admin));
        let body = body_json(send(&state, list).await).await;
        let medicals = body["data"].as_array().unwrap();
        assert_eq!(medicals.len(), 2);

        let joana = medicals.iter().find(|m| m["first_name"] == "Joana").unwrap();
        assert_eq!(joana["last_name"], "Lima");
        assert_eq!(joana["cjppu_number"], "111");
        assert!(medicals.iter().any(|m| m["last_name"] == "Araújo"));
    }
}
