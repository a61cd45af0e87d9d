use axum::{Extension, Router, extract::State, routing::get};
use common::forecast::Forecast;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new().route("/forecasts", get(list_forecasts))
}

pub async fn list_forecasts(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<ApiResponse<Vec<Forecast>>> {
    let forecasts = state
        .services
        .forecasts
        .for_user(&caller)
        .await
        .map_err(|e| e.logged("Failed to load forecasts"))?;

    Ok(ApiResponse::ok("Forecasts", forecasts))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use crate::state::AppState;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn user_without_location_gets_an_empty_list() {
        let state = AppState::in_memory();
        let token = token_for(&state, "ana@example.com", false).await;

        let response = send(&state, empty_request("GET", "/api/v1/forecasts", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"], serde_json::json!([]));
    }
}
