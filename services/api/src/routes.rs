//! API service routes
//!
//! Everything except `/health` lives under `/api/v1`. Protected routers are
//! layered with [`authorize`] for their role set, then all of them with
//! [`authenticate`], so the token is checked before the role.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::middleware::{ADMINS, MEMBERS, authenticate, authorize};
use crate::state::AppState;

mod articles;
mod care;
mod catalog;
mod forecasts;
mod media;
mod questions;
mod recipes;
mod reminders;
mod symptoms;
mod users;

/// Uploads larger than this are refused before reaching a handler
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let members = Router::new()
        .merge(users::member_routes())
        .merge(symptoms::member_routes())
        .merge(care::member_routes())
        .merge(recipes::member_routes())
        .merge(articles::member_routes())
        .merge(questions::member_routes())
        .merge(reminders::member_routes())
        .merge(catalog::member_routes())
        .merge(media::member_routes())
        .merge(forecasts::member_routes())
        .route_layer(from_fn_with_state(MEMBERS, authorize));

    let admins = Router::new()
        .merge(users::admin_routes())
        .merge(symptoms::admin_routes())
        .merge(articles::admin_routes())
        .merge(catalog::admin_routes())
        .route_layer(from_fn_with_state(ADMINS, authorize));

    let protected = members
        .merge(admins)
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let api = users::public_routes().merge(protected);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness plus a database ping when a pool is attached
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let Some(pool) = &state.pool else {
        return (StatusCode::OK, Json(json!({ "status": "ok", "database": "none" })));
    };

    match common::database::health_check(pool).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "status": "ok", "database": "up" }))),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "down" })),
        ),
        Err(e) => {
            error!(target: "telemetry", "Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "down" })),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Response, header};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Send one request through a fresh router over `state`
    pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    /// Register and log in through the API, optionally promoting to admin
    pub async fn token_for(state: &AppState, email: &str, admin: bool) -> String {
        let register = json_request(
            "POST",
            "/api/v1/users",
            None,
            json!({ "name": "Ana", "email": email, "password": "correct horse", "city": "Recife", "country": "Brazil" }),
        );
        let response = send(state, register).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        if admin {
            promote(state, email).await;
        }

        let login = json_request(
            "POST",
            "/api/v1/users/login",
            None,
            json!({ "email": email, "password": "correct horse" }),
        );
        let body = body_json(send(state, login).await).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn promote(state: &AppState, email: &str) {
        use common::store::Filter;

        let repos = state.services.users.repositories();
        let mut user = repos
            .users
            .first(Filter::new().eq("email", email))
            .await
            .unwrap()
            .unwrap();
        user.role = "admin".to_string();
        repos.users.update(&user).await.unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn health_without_database() {
        let state = AppState::in_memory();
        let response = send(&state, empty_request("GET", "/health", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["database"], "none");
    }

    #[tokio::test]
    async fn missing_token_is_401_with_empty_body() {
        let state = AppState::in_memory();
        let response = send(&state, empty_request("GET", "/api/v1/symptoms", None)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn forged_token_is_401() {
        let state = AppState::in_memory();
        let response = send(&state, empty_request("GET", "/api/v1/users/me", Some("not.a.jwt"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    fn signed_token(role: Option<&str>) -> String {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let now = chrono::Utc::now().timestamp();
        let mut claims = json!({
            "email": "ghost@example.com",
            "user_uuid": uuid::Uuid::new_v4(),
            "iat": now,
            "exp": now + 3600,
        });
        if let Some(role) = role {
            claims["role"] = json!(role);
        }
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
    }

    #[tokio::test]
    async fn valid_token_without_a_known_role_is_403() {
        let state = AppState::in_memory();

        for token in [signed_token(None), signed_token(Some("nurse"))] {
            let response = send(&state, empty_request("GET", "/api/v1/symptoms", Some(&token))).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert!(body_bytes(response).await.is_empty());
        }

        let member = signed_token(Some("user"));
        let response = send(&state, empty_request("GET", "/api/v1/symptoms", Some(&member))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_route_rejects_plain_users() {
        let state = AppState::in_memory();
        let token = token_for(&state, "ana@example.com", false).await;

        let request = json_request(
            "POST",
            "/api/v1/symptoms",
            Some(&token),
            json!({ "name": "Fatigue", "scale": 3 }),
        );
        let response = send(&state, request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn symptom_then_daily_monitoring() {
        let state = AppState::in_memory();
        let admin = token_for(&state, "root@example.com", true).await;
        let user = token_for(&state, "ana@example.com", false).await;

        let request = json_request(
            "POST",
            "/api/v1/symptoms",
            Some(&admin),
            json!({ "name": "Fatigue", "is_active": true, "scale": 3 }),
        );
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let symptom = body["data"]["uuid"].as_str().unwrap().to_string();

        let monitor = |scale: i64| {
            json_request(
                "POST",
                "/api/v1/monitorings",
                Some(&user),
                json!({ "symptom": symptom, "scale": scale }),
            )
        };

        let response = send(&state, monitor(4)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], 400);

        assert_eq!(send(&state, monitor(2)).await.status(), StatusCode::OK);
        assert_eq!(send(&state, monitor(2)).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_registration_is_409() {
        let state = AppState::in_memory();
        token_for(&state, "ana@example.com", false).await;

        let request = json_request(
            "POST",
            "/api/v1/users",
            None,
            json!({ "name": "Ana", "email": "ana@example.com", "password": "correct horse" }),
        );
        let response = send(&state, request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["code"], 409);
        assert!(body["data"].is_null());
    }
}
