//! Authentication and authorization middleware
//!
//! [`authenticate`] verifies the bearer token and stores an [`AuthUser`] in
//! the request extensions; [`authorize`] checks that user's role against the
//! allowed set it was layered with. Both reject with a bare status code and
//! an empty body.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::user::Role;
use crate::state::AppState;

/// Any signed-in account
pub const MEMBERS: &[Role] = &[Role::User, Role::Admin];

/// Administrators only
pub const ADMINS: &[Role] = &[Role::Admin];

/// Caller identity taken from the token claims
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub user_uuid: Uuid,
    /// `None` when the token carried no role or one this service does not know
    pub role: Option<Role>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Verify the bearer token and expose its claims to downstream handlers
pub async fn authenticate(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = state.jwt.validate(bearer.token()).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(AuthUser {
        email: claims.email,
        user_uuid: claims.user_uuid,
        role: claims.role.as_deref().and_then(Role::parse),
    });

    Ok(next.run(req).await)
}

/// Reject callers whose role is not in the layered set
pub async fn authorize(
    State(allowed): State<&'static [Role]>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(user) = req.extensions().get::<AuthUser>() else {
        warn!("Authorization check ran without an authenticated user");
        return Err(StatusCode::FORBIDDEN);
    };

    match user.role {
        Some(role) if allowed.contains(&role) => {}
        Some(role) => {
            debug!("Role {} of {} not allowed on {}", role, user.email, req.uri().path());
            return Err(StatusCode::FORBIDDEN);
        }
        None => {
            debug!("Token for {} carries no known role", user.email);
            return Err(StatusCode::FORBIDDEN);
        }
    }

    Ok(next.run(req).await)
}
