//! Router tests for the exporter's HTTP surface.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tokio::sync::RwLock;
use tower::ServiceExt;

use teraslice_exporter::{SharedMetrics, build_router};
use teraslice_metrics::TerasliceMetrics;

fn empty_metrics() -> SharedMetrics {
    Arc::new(RwLock::new(TerasliceMetrics::new()))
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn root_points_to_metrics() {
    let (status, _, body) = get(build_router(empty_metrics()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "See the '/metrics' endpoint for the teraslice exporter.");
}

#[tokio::test]
async fn metrics_before_first_cycle_declares_gauges() {
    let (status, content_type, body) = get(build_router(empty_metrics()), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/openmetrics-text"));
    assert!(body.contains("# TYPE teraslice_controller_workers_active gauge"));
    assert!(body.contains("# TYPE teraslice_execution_status gauge"));
    assert!(body.trim_end().ends_with("# EOF"));
    // No samples yet.
    assert!(!body.contains("teraslice_controller_workers_active{"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (status, _, _) = get(build_router(empty_metrics()), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
