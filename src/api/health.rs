use axum::{extract::Extension, http::StatusCode, response::Json};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::app_state::models::AppState;

pub async fn health_api() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn health_db(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<StatusCode, StatusCode> {
    let pg_health_check = app_state
        .postgres_service
        .repository_health_check
        .check()
        .await
        .unwrap_or(false);

    if pg_health_check {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
