//! teraslice-exporter — Prometheus exporter for a Teraslice cluster.
//!
//! Wires the collector and the gauge registry together:
//!
//! ```text
//! Poller (every TERASLICE_QUERY_DELAY ms)
//!   ├── TerasliceStats::update() → ClusterSnapshot
//!   └── TerasliceMetrics::project() under the write lock
//!
//! axum server
//!   ├── GET /        → pointer text
//!   └── GET /metrics → TerasliceMetrics::render() under the read lock
//! ```

pub mod config;
pub mod poller;
pub mod server;

pub use config::ExporterConfig;
pub use poller::{Poller, SharedMetrics};
pub use server::{METRICS_PATH, build_router};
