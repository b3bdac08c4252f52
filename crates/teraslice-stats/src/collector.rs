//! Cluster stats collector.
//!
//! One call to [`TerasliceStats::update`] is one observation cycle:
//!
//! ```text
//! update()
//!   ├── phase 1 (concurrent): /, /v1/jobs, /v1/cluster/controllers, /v1/cluster/state
//!   └── phase 2 (batched):    /v1/ex/<ex_id> for every controller
//! ```
//!
//! Execution ids are only known once the controller list is in, so phase 2
//! waits on phase 1. The held [`ClusterSnapshot`] is replaced only when
//! every fetch of the cycle succeeded.

use std::time::{Duration, Instant};

use tracing::{debug, warn};
use url::Url;

use crate::client::ApiClient;
use crate::error::StatsResult;
use crate::types::*;

/// Tunables for one collection cycle.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// `size` parameter of the job list query.
    pub job_page_size: usize,
    /// Execution detail fetches in flight at once.
    pub execution_batch_size: usize,
    /// Pause between two execution batches.
    pub execution_batch_delay: Duration,
    /// Upper bound for each individual fetch.
    pub request_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            job_page_size: 200,
            execution_batch_size: 10,
            execution_batch_delay: Duration::from_millis(25),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Collects [`ClusterSnapshot`]s from a single Teraslice cluster.
pub struct TerasliceStats {
    client: ApiClient,
    display_url: String,
    config: CollectorConfig,
    snapshot: Option<ClusterSnapshot>,
}

impl TerasliceStats {
    /// Create a collector with the default [`CollectorConfig`].
    pub fn new(base_url: Url, display_url: Option<String>) -> StatsResult<Self> {
        Self::with_config(base_url, display_url, CollectorConfig::default())
    }

    pub fn with_config(
        base_url: Url,
        display_url: Option<String>,
        config: CollectorConfig,
    ) -> StatsResult<Self> {
        let display_url = display_url.unwrap_or_else(|| base_url.to_string());
        let client = ApiClient::new(base_url, config.request_timeout)?;
        Ok(Self {
            client,
            display_url,
            config,
            snapshot: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        self.client.base_url()
    }

    pub fn display_url(&self) -> &str {
        &self.display_url
    }

    /// The last successfully collected snapshot.
    pub fn snapshot(&self) -> Option<&ClusterSnapshot> {
        self.snapshot.as_ref()
    }

    /// Run one cycle and, on success, replace the held snapshot.
    ///
    /// On failure the previous snapshot is left as it was and the error
    /// names the URL of the fetch that failed.
    pub async fn update(&mut self) -> StatsResult<&ClusterSnapshot> {
        let snapshot = self.collect().await?;
        Ok(self.snapshot.insert(snapshot))
    }

    /// Run one cycle and return a fresh snapshot without storing it.
    pub async fn collect(&self) -> StatsResult<ClusterSnapshot> {
        let jobs_path = format!("/v1/jobs?size={}", self.config.job_page_size);

        let (info, jobs, controllers, state) = tokio::try_join!(
            self.client.get_json::<ClusterInfo>("/"),
            self.client.get_json::<Vec<JobRecord>>(&jobs_path),
            self.client.get_json::<Vec<ControllerStats>>("/v1/cluster/controllers"),
            self.client.get_json::<ClusterState>("/v1/cluster/state"),
        )?;

        let (executions, executions_ms) = self.fetch_executions(&controllers.data).await?;

        Ok(ClusterSnapshot {
            base_url: self.client.base_url().to_string(),
            display_url: self.display_url.clone(),
            info: info.data,
            jobs: jobs.data,
            controllers: controllers.data,
            executions,
            state: state.data,
            query_duration: QueryDuration {
                info: info.elapsed_ms,
                jobs: jobs.elapsed_ms,
                controllers: controllers.elapsed_ms,
                executions: executions_ms,
                state: state.elapsed_ms,
            },
        })
    }

    /// Fetch `/v1/ex/<ex_id>` for every controller, `execution_batch_size`
    /// at a time. Returns the records in controller order and the wall-clock
    /// milliseconds of the whole phase.
    async fn fetch_executions(
        &self,
        controllers: &[ControllerStats],
    ) -> StatsResult<(Vec<ExecutionRecord>, u64)> {
        let started = Instant::now();
        let batch_size = self.config.execution_batch_size.max(1);
        let client = &self.client;
        let mut executions = Vec::with_capacity(controllers.len());

        for (i, batch) in controllers.chunks(batch_size).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.execution_batch_delay).await;
            }

            let fetches = batch.iter().map(|controller| async move {
                let url = client.resolve_segments(&["v1", "ex", controller.ex_id.as_str()])?;
                client.get_json_url::<ExecutionRecord>(url).await
            });
            let fetched = futures::future::try_join_all(fetches).await?;

            for (controller, execution) in batch.iter().zip(fetched) {
                if execution.data.ex_id != controller.ex_id {
                    warn!(
                        expected = %controller.ex_id,
                        got = %execution.data.ex_id,
                        "execution record does not match its controller"
                    );
                }
                executions.push(execution.data);
            }
            debug!(batch = i + 1, size = batch.len(), "execution batch fetched");
        }

        Ok((executions, started.elapsed().as_millis() as u64))
    }
}
