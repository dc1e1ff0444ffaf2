use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::models::auth::AuthenticatedAdmin;
use crate::services::tokens::TokenService;

impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "Invalid Authorization header format"))?;

        let tokens = parts
            .extensions
            .get::<TokenService>()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Token service not configured"))?;

        let claims = tokens
            .validate_token(token)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token"))?;

        let admin_id = claims
            .principal_id()
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token"))?;

        Ok(AuthenticatedAdmin {
            admin_id,
            first_name: claims.first_name,
            last_name: claims.last_name,
        })
    }
}
