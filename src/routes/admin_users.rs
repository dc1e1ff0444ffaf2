use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::models::admin_user::{validate_admin_user, CreateAdminUserRequest};
use crate::models::auth::AuthenticatedAdmin;
use crate::routes::{failed_validation_response, server_error_response, store_error_response};
use crate::services::StoreError;
use crate::validation::Validator;
use crate::AppState;

pub async fn create_admin_user(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreateAdminUserRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let mut v = Validator::new();
    validate_admin_user(&mut v, &body);
    if !v.valid() {
        return Err(failed_validation_response(v));
    }

    let password_hash =
        bcrypt::hash(&body.password, 12).map_err(server_error_response)?;

    match state
        .admin_users
        .insert(&body.first_name, &body.last_name, &body.email, &password_hash)
        .await
    {
        Ok(admin) => Ok((StatusCode::CREATED, Json(json!({ "admin_user": admin })))),
        Err(StoreError::DuplicateEmail) => {
            let mut v = Validator::new();
            v.add_error("email", "an admin user with this email address already exists");
            Err(failed_validation_response(v))
        }
        Err(other) => Err(store_error_response(other)),
    }
}
