//! Typed records for the Teraslice REST API.
//!
//! Each upstream resource is decoded into one of these types right after
//! the body is read, so nothing downstream handles untyped JSON. Optional
//! or informational fields default when absent; identifiers are required.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Execution identifier (`ex_id`).
pub type ExId = String;

/// Job identifier (`job_id`).
pub type JobId = String;

/// Node identifier, the key of the `/v1/cluster/state` map.
pub type NodeId = String;

// ── Cluster master ────────────────────────────────────────────────

/// Response of `GET /`: metadata about the cluster master.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterInfo {
    pub arch: String,
    pub clustering_type: String,
    pub name: String,
    pub node_version: String,
    pub platform: String,
    pub teraslice_version: String,
}

// ── Jobs ──────────────────────────────────────────────────────────

/// One entry of `GET /v1/jobs`. Only counted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobRecord {
    pub job_id: JobId,
    pub name: String,
}

// ── Execution controllers ─────────────────────────────────────────

/// One entry of `GET /v1/cluster/controllers`.
///
/// ```text
/// {
///   "ex_id": "5ba1da6a-...", "job_id": "7e6dfa3c-...", "name": "my-job-name",
///   "workers_available": 0, "workers_active": 6, "workers_joined": 6,
///   "workers_reconnected": 0, "workers_disconnected": 0,
///   "failed": 1, "queued": 7, "processed": 204156, "slicers": 1, ...
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerStats {
    pub ex_id: ExId,
    pub job_id: JobId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub workers_available: u64,
    #[serde(default)]
    pub workers_active: u64,
    #[serde(default)]
    pub workers_joined: u64,
    #[serde(default)]
    pub workers_reconnected: u64,
    #[serde(default)]
    pub workers_disconnected: u64,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub queued: u64,
    #[serde(default)]
    pub slicers: u64,
}

// ── Executions ────────────────────────────────────────────────────

/// Lifecycle state of an execution (`_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionStatus {
    Completed,
    Failed,
    Failing,
    Initializing,
    Paused,
    Pending,
    Recovering,
    Rejected,
    Running,
    Scheduling,
    Stopped,
    Stopping,
    Terminated,
    /// A status this exporter does not know about.
    Unknown,
}

impl ExecutionStatus {
    /// Every known lifecycle state, in exposition order.
    pub const ALL: [ExecutionStatus; 13] = [
        ExecutionStatus::Completed,
        ExecutionStatus::Failed,
        ExecutionStatus::Failing,
        ExecutionStatus::Initializing,
        ExecutionStatus::Paused,
        ExecutionStatus::Pending,
        ExecutionStatus::Recovering,
        ExecutionStatus::Rejected,
        ExecutionStatus::Running,
        ExecutionStatus::Scheduling,
        ExecutionStatus::Stopped,
        ExecutionStatus::Stopping,
        ExecutionStatus::Terminated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Failing => "failing",
            ExecutionStatus::Initializing => "initializing",
            ExecutionStatus::Paused => "paused",
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Recovering => "recovering",
            ExecutionStatus::Rejected => "rejected",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Scheduling => "scheduling",
            ExecutionStatus::Stopped => "stopped",
            ExecutionStatus::Stopping => "stopping",
            ExecutionStatus::Terminated => "terminated",
            ExecutionStatus::Unknown => "unknown",
        }
    }
}

impl From<String> for ExecutionStatus {
    fn from(s: String) -> Self {
        ExecutionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .unwrap_or(ExecutionStatus::Unknown)
    }
}

impl From<ExecutionStatus> for String {
    fn from(status: ExecutionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of `GET /v1/ex/<ex_id>`.
///
/// Only the fields the exporter reports on are kept; operations, assets,
/// targets and the rest of the job definition are dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionRecord {
    pub ex_id: ExId,
    pub job_id: JobId,
    #[serde(default)]
    pub name: String,
    /// CPU cores requested per worker.
    #[serde(default)]
    pub cpu: Option<f64>,
    /// Memory in bytes requested per worker.
    #[serde(default)]
    pub memory: Option<f64>,
    /// Configured slicer count.
    #[serde(default)]
    pub slicers: u64,
    /// Configured worker count. The number actually running may differ.
    #[serde(default)]
    pub workers: u64,
    #[serde(rename = "_status")]
    pub status: ExecutionStatus,
    #[serde(rename = "_created", default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "_updated", default)]
    pub updated: Option<DateTime<Utc>>,
}

// ── Cluster state ─────────────────────────────────────────────────

/// One active assignment on a node (a worker pod in kubernetes mode).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerAssignment {
    pub assignment: String,
    /// Absent for assignments that do not belong to an execution.
    pub ex_id: Option<ExId>,
    pub job_id: JobId,
    /// Container image, e.g. `teraslice:v0.70.0`.
    pub image: String,
    pub pod_name: String,
    pub worker_id: String,
}

/// One node of `GET /v1/cluster/state`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeState {
    pub node_id: NodeId,
    pub hostname: String,
    pub state: String,
    pub active: Vec<WorkerAssignment>,
}

/// Response of `GET /v1/cluster/state`, ordered by node id.
pub type ClusterState = BTreeMap<NodeId, NodeState>;

// ── Snapshot ──────────────────────────────────────────────────────

/// Elapsed time per fetched resource, in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryDuration {
    pub info: u64,
    pub jobs: u64,
    pub controllers: u64,
    /// Wall-clock time of the whole batched execution phase.
    pub executions: u64,
    pub state: u64,
}

impl QueryDuration {
    /// `(query_name, milliseconds)` pairs in exposition order.
    pub fn entries(&self) -> [(&'static str, u64); 5] {
        [
            ("info", self.info),
            ("jobs", self.jobs),
            ("controllers", self.controllers),
            ("executions", self.executions),
            ("state", self.state),
        ]
    }
}

/// One consistent observation of a Teraslice cluster.
///
/// Built fresh by every successful collection cycle and never mutated
/// afterwards. `executions` holds exactly one record per controller, in
/// controller order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSnapshot {
    pub base_url: String,
    /// Value used for the `url` label.
    pub display_url: String,
    pub info: ClusterInfo,
    pub jobs: Vec<JobRecord>,
    pub controllers: Vec<ControllerStats>,
    pub executions: Vec<ExecutionRecord>,
    pub state: ClusterState,
    pub query_duration: QueryDuration,
}
