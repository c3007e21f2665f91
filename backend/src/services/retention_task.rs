//! Periodic retention sweep with an explicit lifecycle.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::services::retention_service::{RetentionService, RetentionSweepResult};

pub struct RetentionTask {
    service: Arc<RetentionService>,
    period: Duration,
    run_on_start: bool,
}

impl RetentionTask {
    pub fn new(service: Arc<RetentionService>, period: Duration, run_on_start: bool) -> Self {
        Self {
            service,
            period,
            run_on_start,
        }
    }

    /// Spawn the sweep loop. Sweeps are serialized by the service, so manual
    /// triggers and ticks never overlap.
    pub fn start(self) -> RetentionTaskHandle {
        let cancel = CancellationToken::new();
        let service = self.service.clone();
        let token = cancel.clone();
        let period = self.period;
        let run_on_start = self.run_on_start;

        let join = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            if !run_on_start {
                ticker.tick().await;
            }

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = service.run_sweep().await {
                            tracing::warn!("Retention cleanup failed: {}", e);
                        }
                    }
                }
            }
            tracing::debug!("Retention task stopped");
        });

        tracing::info!(
            interval_secs = period.as_secs(),
            run_on_start,
            "Retention task started"
        );
        RetentionTaskHandle {
            service: self.service,
            cancel,
            join,
        }
    }
}

pub struct RetentionTaskHandle {
    service: Arc<RetentionService>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl RetentionTaskHandle {
    /// Run a sweep now and wait for its result.
    pub async fn trigger(&self) -> Result<RetentionSweepResult> {
        self.service.run_sweep().await
    }

    /// Stop the loop and wait for an in-flight sweep to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            tracing::warn!("Retention task ended abnormally: {}", e);
        }
    }
}
