//! The touch handler.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{debug, warn};

use lull_controller::ControllerError;

use crate::ApiState;

/// Query parameters of a touch request.
///
/// Deserialization rejects a missing name, a missing timeout, and a
/// non-integer timeout with 400 before the controller is involved.
#[derive(Deserialize)]
pub struct TouchParams {
    /// Workload name, matched against the runtime's naming convention.
    name: String,
    /// Idle window in seconds.
    timeout: u64,
}

/// GET /?name=...&timeout=...
///
/// Ensures the named workload is running and keeps it alive for at
/// least `timeout` seconds from now.
pub async fn touch(
    State(state): State<ApiState>,
    Query(params): Query<TouchParams>,
) -> impl IntoResponse {
    debug!(name = %params.name, timeout = params.timeout, "touch received");

    let controller = state.registry.resolve(&params.name).await;
    match controller.touch(Duration::from_secs(params.timeout)).await {
        Ok(outcome) => (StatusCode::OK, outcome.as_str().to_string()),
        Err(e) => {
            warn!(name = %params.name, error = %e, "touch failed");
            let status = match e {
                ControllerError::WorkloadNotFound(_) => StatusCode::NOT_FOUND,
                ControllerError::UnknownState { .. } | ControllerError::StartFailed { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            };
            (status, e.to_string())
        }
    }
}
