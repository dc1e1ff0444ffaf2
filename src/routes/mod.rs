pub mod admin_users;
pub mod auth;
pub mod categories;
pub mod files;
pub mod health;
pub mod items;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::services::StoreError;
use crate::validation::Validator;

pub(crate) fn not_found_response() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested resource could not be found" })),
    )
}

pub(crate) fn bad_request_response(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

pub(crate) fn edit_conflict_response() -> (StatusCode, Json<Value>) {
    (
        StatusCode::CONFLICT,
        Json(json!({ "error": "unable to update the record due to an edit conflict, please try again" })),
    )
}

/// Generic 500: the detail goes to the server log, never to the client.
pub(crate) fn server_error_response(err: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    tracing::error!("request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "the server encountered a problem and could not process your request" })),
    )
}

/// 400 with the per-field messages collected by the validator.
pub(crate) fn failed_validation_response(v: Validator) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": v.into_errors() })))
}

pub(crate) fn store_error_response(err: StoreError) -> (StatusCode, Json<Value>) {
    match err {
        StoreError::RecordNotFound => not_found_response(),
        StoreError::EditConflict => edit_conflict_response(),
        other => server_error_response(other),
    }
}
