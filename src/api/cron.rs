use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::app_state::models::AppState;

/// Manual trigger: runs the broadcast job and answers once it has finished.
/// The job runs detached, so a caller hanging up does not cut it short.
pub async fn cron_job(Extension(app_state): Extension<Arc<AppState>>) -> impl IntoResponse {
    info!("Broadcast triggered through /cron");

    match app_state.broadcast_job.run_detached().await {
        Ok(report) => (StatusCode::OK, Json(json!(report))),
        Err(e) => {
            error!("Broadcast task aborted: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "broadcast aborted"})),
            )
        }
    }
}
