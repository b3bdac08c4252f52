//! HTTP endpoints.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Pointer to the metrics endpoint |
//! | GET | `/metrics` | OpenMetrics exposition |

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::error;

use crate::poller::SharedMetrics;

pub const METRICS_PATH: &str = "/metrics";

#[derive(Clone)]
struct ServerState {
    metrics: SharedMetrics,
}

/// Build the exporter router.
pub fn build_router(metrics: SharedMetrics) -> Router {
    Router::new()
        .route("/", get(root))
        .route(METRICS_PATH, get(prometheus_metrics))
        .with_state(ServerState { metrics })
}

async fn root() -> String {
    format!("See the '{METRICS_PATH}' endpoint for the teraslice exporter.")
}

/// GET /metrics: the last successfully projected metric set.
async fn prometheus_metrics(State(state): State<ServerState>) -> Response {
    let metrics = state.metrics.read().await;
    match metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, teraslice_metrics::CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}
