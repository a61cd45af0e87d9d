//! User model and related payloads

use chrono::{DateTime, NaiveDate, Utc};
use common::store::{Entity, SqlValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Authorization role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub role: String,
    pub is_active: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Stored role; unknown values fall back to the least privileged one
    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::User)
    }

    /// Whether the account may authenticate
    pub fn can_login(&self) -> bool {
        self.is_active && !self.is_banned && self.deleted_at.is_none()
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["email"]];

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("name", self.name.clone().into()),
            ("last_name", self.last_name.clone().into()),
            ("birth_date", self.birth_date.into()),
            ("sex", self.sex.clone().into()),
            ("city", self.city.clone().into()),
            ("state", self.state.clone().into()),
            ("country", self.country.clone().into()),
            ("email", self.email.clone().into()),
            ("password", self.password.clone().into()),
            ("role", self.role.clone().into()),
            ("is_active", self.is_active.into()),
            ("is_banned", self.is_banned.into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
            ("deleted_at", self.deleted_at.into()),
        ]
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn assign_default(&mut self, column: &str, now: DateTime<Utc>) {
        match column {
            "uuid" => self.uuid = Uuid::new_v4(),
            "created_at" => self.created_at = now,
            _ => {}
        }
    }
}

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    pub email: String,
    pub password: String,
}

/// Full replacement of the profile fields
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

/// User login credentials
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub banned: bool,
}

#[cfg(test)]
pub(crate) fn test_user(email: &str, role: Role) -> User {
    let now = Utc::now();
    User {
        id: 1,
        uuid: Uuid::new_v4(),
        name: "Ana".to_string(),
        last_name: "Souza".to_string(),
        birth_date: None,
        sex: String::new(),
        city: "Recife".to_string(),
        state: "PE".to_string(),
        country: "Brazil".to_string(),
        email: email.to_string(),
        password: String::new(),
        role: role.as_str().to_string(),
        is_active: true,
        is_banned: false,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}
