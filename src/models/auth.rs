use serde::{Deserialize, Serialize};

use crate::models::admin_user::AdminUser;
use crate::services::tokens::TokenError;

/// Signed payload shared by access and refresh tokens. Modeled as a fixed
/// record rather than an open claim map so every field is checked on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id, stringified
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
    pub first_name: String,
    pub last_name: String,
}

impl Claims {
    /// Parse the subject back into the admin user id it was minted from.
    pub fn principal_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::MalformedSubject)
    }
}

/// Access/refresh token pair issued on login and on every refresh.
/// Never persisted; owned by whoever asked for it.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Minimal identity projected into a token — never carries password material.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<&AdminUser> for Principal {
    fn from(admin: &AdminUser) -> Self {
        Self {
            id: admin.id,
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
        }
    }
}

/// Extracted from a validated access token — available via axum extractors
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub admin_id: i64,
    pub first_name: String,
    pub last_name: String,
}
