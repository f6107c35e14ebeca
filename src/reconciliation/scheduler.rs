//! The periodic reconciliation loop.
//!
//! Every interval, and whenever [`ReconciliationHandle::trigger`] is called,
//! the loop pushes today's per-employee totals through
//! [`WorkHoursService::reconcile_day`]. Errors are logged and the loop keeps
//! ticking; it only exits on [`ReconciliationHandle::stop`].

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};
use uuid::Uuid;

use super::service::WorkHoursService;

/// Supplies the day a tick reconciles.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// A reconciliation loop that has not been started yet.
pub struct ReconciliationLoop {
    service: WorkHoursService,
    clock: Clock,
}

impl ReconciliationLoop {
    /// Creates a loop that reconciles the current UTC date on each tick.
    pub fn new(service: WorkHoursService) -> Self {
        Self {
            service,
            clock: Arc::new(|| Utc::now().date_naive()),
        }
    }

    /// Replaces the source of the date each tick reconciles.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Spawns the loop onto the current tokio runtime.
    ///
    /// The first tick runs immediately.
    pub fn start(self) -> ReconciliationHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let trigger = Arc::new(Notify::new());
        let (ticks_tx, ticks_rx) = watch::channel(0u64);

        let period = self.service.config().config().reconciliation.interval();
        let loop_trigger = Arc::clone(&trigger);

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = period.as_secs(), "Reconciliation loop started");

            loop {
                let reason = tokio::select! {
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                    _ = loop_trigger.notified() => "trigger",
                    _ = ticker.tick() => "interval",
                };

                run_tick(&self.service, &self.clock, reason).await;
                ticks_tx.send_modify(|ticks| *ticks += 1);
            }

            info!("Reconciliation loop stopped");
        });

        ReconciliationHandle {
            stop: stop_tx,
            trigger,
            ticks: ticks_rx,
            task,
        }
    }
}

async fn run_tick(service: &WorkHoursService, clock: &Clock, reason: &'static str) {
    let run_id = Uuid::new_v4();
    let date = clock();

    match service.reconcile_day(date).await {
        Ok(outcome) => info!(
            run_id = %run_id,
            reason,
            %date,
            pushed = outcome.pushed,
            failed = outcome.failed,
            warnings = outcome.warnings.len(),
            "Reconciliation tick completed"
        ),
        Err(err) => error!(
            run_id = %run_id,
            reason,
            %date,
            error = %err,
            "Reconciliation tick failed"
        ),
    }
}

/// Controls a running reconciliation loop.
pub struct ReconciliationHandle {
    stop: watch::Sender<bool>,
    trigger: Arc<Notify>,
    ticks: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl ReconciliationHandle {
    /// Requests an immediate tick, e.g. after an aggregation change.
    ///
    /// Triggers that arrive while a tick is running coalesce into one.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Number of ticks completed so far.
    pub fn ticks(&self) -> u64 {
        *self.ticks.borrow()
    }

    /// Waits until at least `count` ticks have completed.
    ///
    /// Returns immediately if the loop has already exited.
    pub async fn wait_for_ticks(&mut self, count: u64) {
        let _ = self.ticks.wait_for(|ticks| *ticks >= count).await;
    }

    /// Stops the loop and waits for the current tick to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(err) = self.task.await {
            error!(error = %err, "Reconciliation loop panicked");
        }
    }
}
