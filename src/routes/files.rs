use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};

use crate::AppState;

/// Serve a stored attachment by key. Keys are generated server-side and
/// always alphanumeric; anything else is treated as unknown.
pub async fn serve_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, StatusCode> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StatusCode::NOT_FOUND);
    }

    let content_type: Option<String> =
        sqlx::query_scalar("SELECT content_type FROM item_attachments WHERE key = $1")
            .bind(&key)
            .fetch_optional(&state.db)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let content_type = content_type.ok_or(StatusCode::NOT_FOUND)?;

    let bytes = state
        .storage
        .read(&key)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len().to_string())
        .body(Body::from(bytes))
        .unwrap())
}
