//! Snapshot → gauge projection.
//!
//! Every gauge family is registered once in [`TerasliceMetrics::new`].
//! Each [`TerasliceMetrics::project`] call clears all families before
//! setting them again, so executions that vanished between two snapshots
//! stop being reported.

use std::collections::HashSet;
use std::sync::atomic::AtomicU64;

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tracing::{debug, warn};

use teraslice_stats::{
    ClusterSnapshot, ClusterState, ControllerStats, ExecutionRecord, ExecutionStatus,
    extract_version_from_image_tag,
};

use crate::labels::*;

type GaugeFamily<L> = Family<L, Gauge<f64, AtomicU64>>;

/// Version information for one execution, derived from cluster state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionVersion {
    pub ex_id: String,
    pub job_id: String,
    pub image: String,
    pub version: String,
}

/// One entry per distinct `ex_id` among the active workers of every node.
///
/// Nodes are visited in id order and workers in list order; the first
/// worker seen for an execution provides its image.
pub fn execution_versions(state: &ClusterState) -> Vec<ExecutionVersion> {
    let mut seen = HashSet::new();
    let mut versions = Vec::new();

    for node in state.values() {
        for worker in &node.active {
            let Some(ex_id) = worker.ex_id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };
            if seen.insert(ex_id) {
                versions.push(ExecutionVersion {
                    ex_id: ex_id.to_string(),
                    job_id: worker.job_id.clone(),
                    image: worker.image.clone(),
                    version: extract_version_from_image_tag(&worker.image).to_string(),
                });
            }
        }
    }

    versions
}

/// The Teraslice gauge registry.
#[derive(Debug)]
pub struct TerasliceMetrics {
    registry: Registry,

    master_info: GaugeFamily<MasterInfoLabels>,

    // Controller gauges.
    workers_active: GaugeFamily<ExecutionLabels>,
    workers_available: GaugeFamily<ExecutionLabels>,
    workers_joined: GaugeFamily<ExecutionLabels>,
    workers_reconnected: GaugeFamily<ExecutionLabels>,
    workers_disconnected: GaugeFamily<ExecutionLabels>,
    slices_processed: GaugeFamily<ExecutionLabels>,
    slices_failed: GaugeFamily<ExecutionLabels>,
    slices_queued: GaugeFamily<ExecutionLabels>,
    slicers_count: GaugeFamily<ExecutionLabels>,

    // Execution gauges.
    cpu_request: GaugeFamily<ExecutionLabels>,
    cpu_limit: GaugeFamily<ExecutionLabels>,
    memory_request: GaugeFamily<ExecutionLabels>,
    memory_limit: GaugeFamily<ExecutionLabels>,
    created_time: GaugeFamily<ExecutionLabels>,
    updated_time: GaugeFamily<ExecutionLabels>,
    execution_slicers: GaugeFamily<ExecutionLabels>,
    execution_workers: GaugeFamily<ExecutionLabels>,
    execution_status: GaugeFamily<ExecutionStatusLabels>,
    execution_info: GaugeFamily<ExecutionInfoLabels>,

    query_duration: GaugeFamily<QueryLabels>,
}

impl Default for TerasliceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TerasliceMetrics {
    /// Create a registry with every Teraslice gauge declared.
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("teraslice");

        let master_info = GaugeFamily::<MasterInfoLabels>::default();
        registry.register(
            "master_info",
            "Information about the Teraslice master node",
            master_info.clone(),
        );

        let workers_active = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_workers_active",
            "Number of Teraslice workers actively processing slices",
            workers_active.clone(),
        );
        let workers_available = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_workers_available",
            "Number of Teraslice workers running and waiting for work",
            workers_available.clone(),
        );
        let workers_joined = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_workers_joined",
            "Total number of Teraslice workers that have joined the execution controller for this job",
            workers_joined.clone(),
        );
        let workers_reconnected = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_workers_reconnected",
            "Total number of Teraslice workers that have reconnected to the execution controller for this job",
            workers_reconnected.clone(),
        );
        let workers_disconnected = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_workers_disconnected",
            "Total number of Teraslice workers that have disconnected from execution controller for this job",
            workers_disconnected.clone(),
        );

        // Monotonic upstream, but reset whenever an execution restarts.
        let slices_processed = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_slices_processed",
            "Number of slices processed",
            slices_processed.clone(),
        );
        let slices_failed = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_slices_failed",
            "Number of slices failed",
            slices_failed.clone(),
        );
        let slices_queued = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_slices_queued",
            "Number of slices queued for processing",
            slices_queued.clone(),
        );
        let slicers_count = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "controller_slicers_count",
            "Number of execution controllers (slicers) running for this execution",
            slicers_count.clone(),
        );

        let cpu_request = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "execution_cpu_request",
            "Requested number of CPU cores for a Teraslice worker container",
            cpu_request.clone(),
        );
        let cpu_limit = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "execution_cpu_limit",
            "CPU core limit for a Teraslice worker container",
            cpu_limit.clone(),
        );
        let memory_request = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "execution_memory_request",
            "Requested amount of memory for a Teraslice worker container",
            memory_request.clone(),
        );
        let memory_limit = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "execution_memory_limit",
            "Memory limit for a Teraslice worker container",
            memory_limit.clone(),
        );
        let created_time = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "execution_created_timestamp_seconds",
            "Execution creation time",
            created_time.clone(),
        );
        let updated_time = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "execution_updated_timestamp_seconds",
            "Execution update time",
            updated_time.clone(),
        );
        let execution_slicers = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "execution_slicers",
            "Number of slicers defined on the execution",
            execution_slicers.clone(),
        );
        let execution_workers = GaugeFamily::<ExecutionLabels>::default();
        registry.register(
            "execution_workers",
            "Number of workers defined on the execution. The number of actual workers can differ from this value",
            execution_workers.clone(),
        );
        let execution_status = GaugeFamily::<ExecutionStatusLabels>::default();
        registry.register(
            "execution_status",
            "Current status of the Teraslice execution",
            execution_status.clone(),
        );
        let execution_info = GaugeFamily::<ExecutionInfoLabels>::default();
        registry.register(
            "execution_info",
            "Information about Teraslice execution",
            execution_info.clone(),
        );

        let query_duration = GaugeFamily::<QueryLabels>::default();
        registry.register(
            "query_duration_seconds",
            "Total time to complete the named query, in seconds",
            query_duration.clone(),
        );

        Self {
            registry,
            master_info,
            workers_active,
            workers_available,
            workers_joined,
            workers_reconnected,
            workers_disconnected,
            slices_processed,
            slices_failed,
            slices_queued,
            slicers_count,
            cpu_request,
            cpu_limit,
            memory_request,
            memory_limit,
            created_time,
            updated_time,
            execution_slicers,
            execution_workers,
            execution_status,
            execution_info,
            query_duration,
        }
    }

    /// Drop every recorded label combination. Declarations are kept.
    pub fn reset(&self) {
        self.master_info.clear();
        for family in self.execution_families() {
            family.clear();
        }
        self.execution_status.clear();
        self.execution_info.clear();
        self.query_duration.clear();
    }

    /// Replace the whole gauge state with the contents of `snapshot`.
    pub fn project(&self, snapshot: &ClusterSnapshot) {
        self.reset();

        let url = snapshot.display_url.as_str();
        let name = snapshot.info.name.as_str();

        let info = &snapshot.info;
        self.master_info
            .get_or_create(&MasterInfoLabels {
                arch: info.arch.clone(),
                clustering_type: info.clustering_type.clone(),
                name: info.name.clone(),
                node_version: info.node_version.clone(),
                platform: info.platform.clone(),
                teraslice_version: info.teraslice_version.clone(),
                url: url.to_string(),
            })
            .set(1.0);

        for controller in &snapshot.controllers {
            self.project_controller(controller, url, name);
        }
        for execution in &snapshot.executions {
            self.project_execution(execution, url, name);
        }

        let versions = execution_versions(&snapshot.state);
        for v in &versions {
            self.execution_info
                .get_or_create(&ExecutionInfoLabels {
                    ex_id: v.ex_id.clone(),
                    job_id: v.job_id.clone(),
                    image: v.image.clone(),
                    version: v.version.clone(),
                    url: url.to_string(),
                    name: name.to_string(),
                })
                .set(1.0);
        }

        for (query_name, ms) in snapshot.query_duration.entries() {
            self.query_duration
                .get_or_create(&QueryLabels {
                    query_name: query_name.to_string(),
                    url: url.to_string(),
                    name: name.to_string(),
                })
                .set(ms as f64 / 1000.0);
        }

        debug!(
            controllers = snapshot.controllers.len(),
            executions = snapshot.executions.len(),
            versions = versions.len(),
            "metrics projected"
        );
    }

    /// Render the registry in the OpenMetrics text format.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }

    fn project_controller(&self, controller: &ControllerStats, url: &str, name: &str) {
        let labels = execution_labels(
            &controller.ex_id,
            &controller.job_id,
            &controller.name,
            url,
            name,
        );

        let set = |family: &GaugeFamily<ExecutionLabels>, value: u64| {
            family.get_or_create(&labels).set(value as f64);
        };
        set(&self.workers_active, controller.workers_active);
        set(&self.workers_available, controller.workers_available);
        set(&self.workers_joined, controller.workers_joined);
        set(&self.workers_reconnected, controller.workers_reconnected);
        set(&self.workers_disconnected, controller.workers_disconnected);
        set(&self.slices_processed, controller.processed);
        set(&self.slices_failed, controller.failed);
        set(&self.slices_queued, controller.queued);
        set(&self.slicers_count, controller.slicers);
    }

    fn project_execution(&self, execution: &ExecutionRecord, url: &str, name: &str) {
        let labels = execution_labels(
            &execution.ex_id,
            &execution.job_id,
            &execution.name,
            url,
            name,
        );

        // Requests and limits are the same setting upstream for now.
        if let Some(cpu) = execution.cpu.filter(|v| *v != 0.0) {
            self.cpu_request.get_or_create(&labels).set(cpu);
            self.cpu_limit.get_or_create(&labels).set(cpu);
        }
        if let Some(memory) = execution.memory.filter(|v| *v != 0.0) {
            self.memory_request.get_or_create(&labels).set(memory);
            self.memory_limit.get_or_create(&labels).set(memory);
        }

        if let Some(created) = execution.created {
            self.created_time
                .get_or_create(&labels)
                .set(created.timestamp_millis() as f64 / 1000.0);
        }
        if let Some(updated) = execution.updated {
            self.updated_time
                .get_or_create(&labels)
                .set(updated.timestamp_millis() as f64 / 1000.0);
        }

        self.execution_slicers
            .get_or_create(&labels)
            .set(execution.slicers as f64);
        self.execution_workers
            .get_or_create(&labels)
            .set(execution.workers as f64);

        if execution.status == ExecutionStatus::Unknown {
            warn!(ex_id = %execution.ex_id, "execution has an unrecognised status");
        }
        for status in ExecutionStatus::ALL {
            let value = if status == execution.status { 1.0 } else { 0.0 };
            self.execution_status
                .get_or_create(&ExecutionStatusLabels::new(&labels, status.as_str()))
                .set(value);
        }
    }

    fn execution_families(&self) -> [&GaugeFamily<ExecutionLabels>; 17] {
        [
            &self.workers_active,
            &self.workers_available,
            &self.workers_joined,
            &self.workers_reconnected,
            &self.workers_disconnected,
            &self.slices_processed,
            &self.slices_failed,
            &self.slices_queued,
            &self.slicers_count,
            &self.cpu_request,
            &self.cpu_limit,
            &self.memory_request,
            &self.memory_limit,
            &self.created_time,
            &self.updated_time,
            &self.execution_slicers,
            &self.execution_workers,
        ]
    }
}

fn execution_labels(
    ex_id: &str,
    job_id: &str,
    job_name: &str,
    url: &str,
    name: &str,
) -> ExecutionLabels {
    ExecutionLabels {
        ex_id: ex_id.to_string(),
        job_id: job_id.to_string(),
        job_name: job_name.to_string(),
        url: url.to_string(),
        name: name.to_string(),
    }
}
