use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{matches_email, Validator};

/// DB row struct. The password hash and row version never leave the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub activated: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub version: i32,
}

// Request DTOs
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

// Validations
pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(matches_email(email), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(password.len() >= 8, "password", "must be at least 8 bytes long");
    v.check(
        password.len() <= 72,
        "password",
        "must not be more than 72 bytes long",
    );
}

pub fn validate_admin_user(v: &mut Validator, request: &CreateAdminUserRequest) {
    v.check(!request.first_name.is_empty(), "first_name", "must be provided");
    v.check(
        request.first_name.len() <= 500,
        "first_name",
        "must not be more than 500 bytes long",
    );

    v.check(!request.last_name.is_empty(), "last_name", "must be provided");
    v.check(
        request.last_name.len() <= 500,
        "last_name",
        "must not be more than 500 bytes long",
    );

    validate_email(v, &request.email);
    validate_password_plaintext(v, &request.password);
}
