//! Account routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::user::{BanRequest, CreateUserRequest, LoginRequest, LoginResponse, UpdateProfileRequest, User};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/login", post(login))
}

pub fn member_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(me).put(update_me).delete(delete_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:uuid/ban", patch(set_banned))
}

/// Register a new account
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    let user = state
        .services
        .users
        .create(payload)
        .await
        .map_err(|e| e.logged("Failed to create user"))?;

    Ok(ApiResponse::created("User created", user))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let login = state
        .services
        .users
        .login(payload)
        .await
        .map_err(|e| e.logged("Login failed"))?;

    Ok(ApiResponse::ok("Logged in", login))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<User>>> {
    let users = state
        .services
        .users
        .list()
        .await
        .map_err(|e| e.logged("Failed to list users"))?;

    Ok(ApiResponse::ok("Users", users))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<ApiResponse<User>> {
    let user = state
        .services
        .users
        .me(&caller)
        .await
        .map_err(|e| e.logged("Failed to load profile"))?;

    Ok(ApiResponse::ok("Profile", user))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<ApiResponse<User>> {
    let user = state
        .services
        .users
        .update_profile(&caller, payload)
        .await
        .map_err(|e| e.logged("Failed to update profile"))?;

    Ok(ApiResponse::ok("Profile updated", user))
}

pub async fn delete_me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .users
        .soft_delete(&caller)
        .await
        .map_err(|e| e.logged("Failed to delete account"))?;

    Ok(ApiResponse::message("Account deleted"))
}

pub async fn set_banned(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<BanRequest>,
) -> ApiResult<ApiResponse<User>> {
    let user = state
        .services
        .users
        .set_banned(uuid, payload.banned)
        .await
        .map_err(|e| e.logged("Failed to change ban"))?;

    Ok(ApiResponse::ok("Ban updated", user))
}
