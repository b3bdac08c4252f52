//! teraslice-metrics — Prometheus exposition for a Teraslice cluster.
//!
//! Turns a [`ClusterSnapshot`](teraslice_stats::ClusterSnapshot) into a set
//! of labeled gauges and renders them in the OpenMetrics text format.
//!
//! # Architecture
//!
//! ```text
//! TerasliceMetrics
//!   ├── new() → registers every gauge family once
//!   ├── project(&ClusterSnapshot) → clears all families, sets them again
//!   └── render() → text for the /metrics endpoint
//! ```

pub mod labels;
pub mod projector;

pub use projector::{ExecutionVersion, TerasliceMetrics, execution_versions};

/// Content type of [`TerasliceMetrics::render`] output.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";
