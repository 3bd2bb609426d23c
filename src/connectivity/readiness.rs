//! Polls the cluster until the expected number of pods are ready

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

use super::ClusterClient;
use crate::error::WaitError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed-interval readiness poller
pub struct ReadinessWaiter<'a, C: ClusterClient + ?Sized> {
    client: &'a C,
    poll_interval: Duration,
}

impl<'a, C: ClusterClient + ?Sized> ReadinessWaiter<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Wait until exactly `expected` pods in `scope` are running with an IP.
    ///
    /// Fetch errors are returned immediately rather than retried.
    #[instrument(skip(self, scope), fields(namespaces = scope.len()))]
    pub async fn wait_ready(
        &self,
        scope: &[String],
        expected: usize,
        deadline: Duration,
    ) -> Result<(), WaitError> {
        let start = Instant::now();
        let mut polls = 0u32;

        loop {
            polls += 1;
            let pods = self
                .client
                .fetch_pods(scope)
                .await
                .map_err(WaitError::Fetch)?;
            let ready = pods.iter().filter(|p| p.is_ready()).count();

            if ready == expected {
                info!(ready, polls, "Pods are running and have IP addresses");
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed >= deadline {
                warn!(ready, expected, ?elapsed, "Timed out waiting for pods");
                return Err(WaitError::Timeout {
                    elapsed,
                    ready,
                    expected,
                });
            }

            debug!(ready, expected, total = pods.len(), "Waiting for pods to be running and have IP addresses");
            sleep(self.poll_interval).await;
        }
    }
}
