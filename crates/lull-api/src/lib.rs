//! lull-api — the HTTP touch surface.
//!
//! One endpoint: `GET /?name=<workload>&timeout=<seconds>`. The
//! traffic-routing layer calls it for every request it proxies; the
//! response body is the literal string `started` or `starting`, or an
//! error message. Parameter validation happens here — the controller
//! only ever sees well-formed touches.

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use lull_controller::WorkloadRegistry;

/// Shared state for the touch handler.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<WorkloadRegistry>,
}

/// Build the touch router.
pub fn build_router(registry: Arc<WorkloadRegistry>) -> Router {
    Router::new()
        .route("/", get(handlers::touch))
        .with_state(ApiState { registry })
}
