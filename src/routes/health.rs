use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn healthcheck(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "available",
            "system_info": {
                "environment": state.config.environment,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })),
    )
}
