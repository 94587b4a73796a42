//! Scan scheduler — drives repeated full-catalog scans.
//!
//! `Idle → Scanning → Waiting → Scanning → … → Stopped`. Sets are evaluated
//! one at a time in catalog order (the upstream rate limit makes parallel
//! evaluation pointless), and accepted results are published to the store
//! as soon as they are computed. Only shutdown ends the loop; a failed
//! cycle is logged and followed by the normal wait.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::catalog::list_sets;
use super::evaluator::ArbitrageEvaluator;
use super::shutdown::Shutdown;
use super::store::SnapshotStore;
use crate::config::ScanConfig;
use crate::market::Marketplace;
use crate::types::{CycleReport, ScanError, ScanStatus, SchedulerState};

pub struct ScanScheduler {
    market: Arc<dyn Marketplace>,
    evaluator: ArbitrageEvaluator,
    store: Arc<SnapshotStore>,
    status: Arc<RwLock<ScanStatus>>,
    interval: Duration,
    tick: Duration,
    cycle_count: u64,
}

impl ScanScheduler {
    pub fn new(
        market: Arc<dyn Marketplace>,
        evaluator: ArbitrageEvaluator,
        store: Arc<SnapshotStore>,
        config: &ScanConfig,
    ) -> Self {
        Self {
            market,
            evaluator,
            store,
            status: Arc::new(RwLock::new(ScanStatus::default())),
            interval: config.rescan_interval(),
            tick: config.tick().max(Duration::from_millis(1)),
            cycle_count: 0,
        }
    }

    /// Override the rescan interval and wait tick (sub-second waits).
    pub fn with_timing(mut self, interval: Duration, tick: Duration) -> Self {
        self.interval = interval;
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    /// Read handle on the store this scheduler writes to.
    pub fn store(&self) -> Arc<SnapshotStore> {
        self.store.clone()
    }

    /// Read handle on the published status.
    pub fn status(&self) -> Arc<RwLock<ScanStatus>> {
        self.status.clone()
    }

    async fn set_state(&self, state: SchedulerState) {
        self.status.write().await.state = state;
    }

    /// Run until `shutdown` is raised.
    pub async fn run(mut self, shutdown: Shutdown) {
        info!(
            interval_secs = self.interval.as_secs(),
            tick_ms = self.tick.as_millis() as u64,
            "Scan loop starting"
        );

        while !shutdown.is_triggered() {
            self.set_state(SchedulerState::Scanning).await;

            match self.run_cycle(&shutdown).await {
                Ok(report) => {
                    info!(
                        cycle = report.cycle_number,
                        sets = report.sets_found,
                        evaluated = report.sets_evaluated,
                        opportunities = report.opportunities,
                        interrupted = report.interrupted,
                        "Cycle complete"
                    );
                    let mut status = self.status.write().await;
                    if !report.interrupted {
                        status.cycles_completed += 1;
                    }
                    status.last_cycle = Some(report);
                    status.last_cycle_at = Some(Utc::now());
                }
                Err(e) => {
                    error!(cycle = self.cycle_count, error = %e, "Cycle failed, continuing to next");
                    self.status.write().await.cycles_failed += 1;
                }
            }

            if shutdown.is_triggered() {
                break;
            }
            self.set_state(SchedulerState::Waiting).await;
            if !self.wait(&shutdown).await {
                break;
            }
        }

        self.set_state(SchedulerState::Stopped).await;
        info!(cycles = self.cycle_count, "Scan loop stopped");
    }

    /// One pass over every set in the catalog.
    ///
    /// Shutdown is checked before each set; a set whose evaluation is still
    /// awaiting upstream when shutdown arrives is dropped unwritten.
    pub async fn run_cycle(&mut self, shutdown: &Shutdown) -> Result<CycleReport, ScanError> {
        self.cycle_count += 1;
        let mut report = CycleReport {
            cycle_number: self.cycle_count,
            ..CycleReport::default()
        };
        info!(cycle = self.cycle_count, "Cycle started");

        let sets = list_sets(self.market.as_ref()).await?;
        report.sets_found = sets.len();

        for set in &sets {
            if shutdown.is_triggered() {
                report.interrupted = true;
                break;
            }

            let verdict = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    report.interrupted = true;
                    break;
                }
                verdict = self.evaluator.evaluate(self.market.as_ref(), set) => verdict,
            };

            report.sets_evaluated += 1;
            if let Some(opportunity) = verdict {
                self.store.replace(opportunity).await;
                report.opportunities += 1;
            }
        }

        if report.interrupted {
            warn!(
                cycle = self.cycle_count,
                evaluated = report.sets_evaluated,
                remaining = report.sets_found - report.sets_evaluated,
                "Cycle interrupted by shutdown"
            );
        }
        Ok(report)
    }

    /// Sleep out the rescan interval in ticks. Returns `false` if shutdown
    /// was raised before the interval elapsed.
    async fn wait(&self, shutdown: &Shutdown) -> bool {
        let mut remaining = self.interval;
        while !remaining.is_zero() {
            if shutdown.is_triggered() {
                return false;
            }
            let step = remaining.min(self.tick);
            tokio::select! {
                _ = shutdown.cancelled() => return false,
                _ = tokio::time::sleep(step) => {}
            }
            remaining = remaining.saturating_sub(step);
        }
        !shutdown.is_triggered()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
