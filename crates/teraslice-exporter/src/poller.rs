//! Poll loop: drives collection and projection on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use teraslice_metrics::TerasliceMetrics;
use teraslice_stats::{StatsResult, TerasliceStats};

/// Gauge registry shared between the poll loop (writer) and the HTTP
/// server (readers). Holding the lock across a whole projection keeps
/// scrapes from seeing a half-built metric set.
pub type SharedMetrics = Arc<RwLock<TerasliceMetrics>>;

/// Shortest polling interval; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Runs collection cycles and publishes their results.
pub struct Poller {
    stats: TerasliceStats,
    metrics: SharedMetrics,
    interval: Duration,
}

impl Poller {
    pub fn new(stats: TerasliceStats, metrics: SharedMetrics, interval: Duration) -> Self {
        Self {
            stats,
            metrics,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Collect one snapshot and project it.
    ///
    /// On error nothing is published and the previous metrics stay in place.
    pub async fn poll_once(&mut self) -> StatsResult<()> {
        debug!(url = %self.stats.base_url(), "updating teraslice cluster information");
        let snapshot = self.stats.update().await?;

        self.metrics.write().await.project(snapshot);

        let q = &snapshot.query_duration;
        debug!(
            info = q.info,
            jobs = q.jobs,
            controllers = q.controllers,
            executions = q.executions,
            state = q.state,
            "query durations (ms)"
        );
        debug!(
            controllers = snapshot.controllers.len(),
            executions = snapshot.executions.len(),
            jobs = snapshot.jobs.len(),
            nodes = snapshot.state.len(),
            "dataset sizes"
        );
        Ok(())
    }

    /// Poll immediately, then every interval, until shutdown.
    ///
    /// Ticks that fall due while a cycle is still running are skipped, so
    /// cycles never overlap.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            url = %self.stats.base_url(),
            "teraslice poller started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        error!(error = %e, url = %self.stats.base_url(), "teraslice update failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("teraslice poller shutting down");
                    break;
                }
            }
        }
    }
}
