//! Label sets for the Teraslice gauges.
//!
//! Every set ends with the global `url` and `name` labels, which identify
//! the cluster being observed.

use prometheus_client::encoding::EncodeLabelSet;

/// Labels of `teraslice_master_info`. `name` doubles as the global label.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct MasterInfoLabels {
    pub arch: String,
    pub clustering_type: String,
    pub name: String,
    pub node_version: String,
    pub platform: String,
    pub teraslice_version: String,
    pub url: String,
}

/// Labels shared by the controller and execution gauges.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ExecutionLabels {
    pub ex_id: String,
    pub job_id: String,
    pub job_name: String,
    pub url: String,
    pub name: String,
}

/// [`ExecutionLabels`] plus the lifecycle state.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ExecutionStatusLabels {
    pub ex_id: String,
    pub job_id: String,
    pub job_name: String,
    pub url: String,
    pub name: String,
    pub status: String,
}

impl ExecutionStatusLabels {
    pub fn new(labels: &ExecutionLabels, status: &str) -> Self {
        Self {
            ex_id: labels.ex_id.clone(),
            job_id: labels.job_id.clone(),
            job_name: labels.job_name.clone(),
            url: labels.url.clone(),
            name: labels.name.clone(),
            status: status.to_string(),
        }
    }
}

/// Labels of `teraslice_execution_info`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ExecutionInfoLabels {
    pub ex_id: String,
    pub job_id: String,
    pub image: String,
    pub version: String,
    pub url: String,
    pub name: String,
}

/// Labels of `teraslice_query_duration_seconds`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct QueryLabels {
    pub query_name: String,
    pub url: String,
    pub name: String,
}
