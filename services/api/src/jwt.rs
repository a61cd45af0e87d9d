//! JWT issuing and validation
//!
//! Tokens are signed with HS256 using the shared secret from [`JwtConfig`]
//! and carry the caller's email, public user uuid, and role.

use common::config::JwtConfig;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::user::User;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub user_uuid: Uuid,
    /// Role name as stored on the account; tokens without one still authenticate
    #[serde(default)]
    pub role: Option<String>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    keys: Arc<Keys>,
    validation: Validation,
    expiry_seconds: u64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            }),
            validation,
            expiry_seconds: config.expiry_hours * 3600,
        }
    }

    /// Token lifetime in seconds
    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_seconds
    }

    /// Sign an access token for `user`
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ApiError::Internal(format!("Failed to get current time: {}", e)))?
            .as_secs();

        let claims = Claims {
            email: user.email.clone(),
            user_uuid: user.uuid,
            role: Some(user.role().as_str().to_string()),
            iat: now,
            exp: now + self.expiry_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry and return the claims
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.keys.decoding, &self.validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Role, test_user};

    fn service(secret: &str) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: secret.to_string(),
            expiry_hours: 1,
        })
    }

    #[test]
    fn issued_tokens_validate() {
        let jwt = service("secret");
        let user = test_user("ana@example.com", Role::Admin);

        let token = jwt.issue(&user).unwrap();
        let claims = jwt.validate(&token).unwrap();

        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.user_uuid, user.uuid);
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn foreign_signatures_are_rejected() {
        let token = service("one").issue(&test_user("a@b.co", Role::User)).unwrap();
        assert!(service("two").validate(&token).is_err());
        assert!(service("one").validate("not.a.token").is_err());
    }
}
