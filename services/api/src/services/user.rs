//! Accounts: registration, login, profile, soft delete, and bans

use chrono::Utc;
use common::store::{DEFAULTED, Filter, Order};
use tracing::{debug, info};
use uuid::Uuid;

use super::{fetch, requester};
use crate::error::{ApiError, ApiResult};
use crate::jwt::JwtService;
use crate::middleware::AuthUser;
use crate::models::user::{
    CreateUserRequest, LoginRequest, LoginResponse, Role, UpdateProfileRequest, User,
};
use crate::repositories::Repositories;
use crate::validation::{require, validate_email, validate_password};

const BCRYPT_COST: u32 = 10;

#[derive(Clone)]
pub struct UserService {
    repos: Repositories,
    jwt: JwtService,
}

impl UserService {
    pub fn new(repos: Repositories, jwt: JwtService) -> Self {
        Self { repos, jwt }
    }

    #[cfg(test)]
    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    /// Register an active, unbanned account with the `user` role
    pub async fn create(&self, req: CreateUserRequest) -> ApiResult<User> {
        let email = req.email.trim().to_lowercase();
        validate_email(&email).map_err(ApiError::BadRequest)?;
        validate_password(&req.password).map_err(ApiError::BadRequest)?;
        require("Name", &req.name).map_err(ApiError::BadRequest)?;

        let password = bcrypt::hash(&req.password, BCRYPT_COST)
            .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

        let now = Utc::now();
        let user = User {
            id: 0,
            uuid: Uuid::nil(),
            name: req.name.trim().to_string(),
            last_name: req.last_name,
            birth_date: req.birth_date,
            sex: req.sex,
            city: req.city,
            state: req.state,
            country: req.country,
            email,
            password,
            role: Role::User.as_str().to_string(),
            is_active: true,
            is_banned: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let user = self
            .repos
            .users
            .create_with_omit(DEFAULTED, user)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ApiError::Conflict("Email already registered".to_string())
                } else {
                    e.into()
                }
            })?;

        info!("Registered user {}", user.uuid);
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, req: LoginRequest) -> ApiResult<LoginResponse> {
        let email = req.email.trim().to_lowercase();
        let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .repos
            .users
            .first(Filter::new().eq("email", email.as_str()))
            .await?
            .ok_or_else(invalid)?;

        let matches = bcrypt::verify(&req.password, &user.password).unwrap_or(false);
        if !matches {
            debug!("Password mismatch for {}", user.uuid);
            return Err(invalid());
        }

        if !user.can_login() {
            return Err(ApiError::forbidden("Account is disabled"));
        }

        let token = self.jwt.issue(&user)?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expiry_seconds(),
            user,
        })
    }

    pub async fn list(&self) -> ApiResult<Vec<User>> {
        Ok(self
            .repos
            .users
            .find(
                Filter::new()
                    .is_null("deleted_at")
                    .order_by("created_at", Order::Asc),
            )
            .await?)
    }

    pub async fn me(&self, caller: &AuthUser) -> ApiResult<User> {
        requester(&self.repos, caller).await
    }

    /// Replace every profile field with the request's values
    pub async fn update_profile(
        &self,
        caller: &AuthUser,
        req: UpdateProfileRequest,
    ) -> ApiResult<User> {
        require("Name", &req.name).map_err(ApiError::BadRequest)?;

        let mut user = requester(&self.repos, caller).await?;
        user.name = req.name.trim().to_string();
        user.last_name = req.last_name;
        user.birth_date = req.birth_date;
        user.sex = req.sex;
        user.city = req.city;
        user.state = req.state;
        user.country = req.country;
        user.updated_at = Utc::now();

        Ok(self.repos.users.update(&user).await?)
    }

    /// Deactivate the caller's account; the row is kept
    pub async fn soft_delete(&self, caller: &AuthUser) -> ApiResult<()> {
        let mut user = requester(&self.repos, caller).await?;
        let now = Utc::now();
        user.deleted_at = Some(now);
        user.is_active = false;
        user.updated_at = now;

        self.repos.users.update(&user).await?;
        info!("Soft-deleted user {}", user.uuid);
        Ok(())
    }

    pub async fn set_banned(&self, uuid: Uuid, banned: bool) -> ApiResult<User> {
        let mut user = fetch(&self.repos.users, uuid, "User").await?;
        user.is_banned = banned;
        user.updated_at = Utc::now();

        let user = self.repos.users.update(&user).await?;
        info!("User {} banned: {}", user.uuid, banned);
        Ok(user)
    }
}
