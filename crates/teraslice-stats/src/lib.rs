//! teraslice-stats — collects the state of a Teraslice cluster.
//!
//! Queries the cluster master's REST API and assembles the answers into a
//! single timed [`ClusterSnapshot`].
//!
//! # Architecture
//!
//! ```text
//! TerasliceStats
//!   ├── ApiClient::get_json() ← one GET per resource, timed, typed
//!   ├── update() → ClusterSnapshot (all-or-nothing)
//!   └── snapshot() → last successful ClusterSnapshot
//! ```

pub mod client;
pub mod collector;
pub mod error;
pub mod types;
pub mod util;

pub use client::{ApiClient, Fetched};
pub use collector::{CollectorConfig, TerasliceStats};
pub use error::{FetchError, StatsError, StatsResult};
pub use types::*;
pub use util::extract_version_from_image_tag;
