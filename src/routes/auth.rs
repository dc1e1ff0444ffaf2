use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde_json::{json, Value};

use crate::models::admin_user::{validate_email, validate_password_plaintext, LoginRequest};
use crate::models::auth::TokenPair;
use crate::routes::{failed_validation_response, server_error_response};
use crate::services::session::SessionError;
use crate::services::tokens::TokenError;
use crate::validation::Validator;
use crate::AppState;

/// JSON tokens envelope that also sets the refresh cookie.
fn tokens_response(tokens: &TokenPair, cookie: &str) -> Response {
    let body = serde_json::to_string(&json!({ "tokens": tokens })).unwrap_or_default();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::SET_COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

/// Session failures collapse to generic responses; whatever detail exists
/// stays in the server log. Only request-body validation ever reports
/// field-level messages.
fn session_error_response(err: SessionError) -> (StatusCode, Json<Value>) {
    match &err {
        SessionError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid authentication credentials" })),
        ),
        SessionError::Token(TokenError::Signing(_))
        | SessionError::Hash(_)
        | SessionError::Store(_) => server_error_response(&err),
        SessionError::MissingCredential
        | SessionError::UnknownPrincipal
        | SessionError::Token(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        ),
    }
}

pub async fn authenticate(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let mut v = Validator::new();
    validate_email(&mut v, &body.email);
    validate_password_plaintext(&mut v, &body.password);
    if !v.valid() {
        return Err(failed_validation_response(v));
    }

    let (tokens, cookie) = state
        .sessions
        .login(&body.email, &body.password)
        .await
        .map_err(session_error_response)?;

    Ok(tokens_response(&tokens, &cookie))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());

    let (tokens, cookie) = state
        .sessions
        .refresh(cookie_header)
        .await
        .map_err(session_error_response)?;

    Ok(tokens_response(&tokens, &cookie))
}

pub async fn logout(State(state): State<AppState>) -> Response {
    Response::builder()
        .status(StatusCode::ACCEPTED)
        .header(header::SET_COOKIE, state.sessions.logout())
        .body(Body::empty())
        .unwrap()
}
