//! Engine wiring: queues, tasks, and the external handle.
//!
//! [`Engine::start`] connects the evaluator and the runner with bounded
//! queues and spawns both. External collaborators hold an
//! [`EngineHandle`] for immediate runs, schedule submission, and
//! read-only schedule snapshots. Producer sends never block: a full
//! queue drops the message, and the outcome is reported to the caller,
//! who is free to ignore it.

mod evaluator;
pub mod messages;
mod runner;

pub use messages::RunRequest;

use crate::clock::WallClock;
use crate::config::FurrowConfig;
use crate::engine::evaluator::Evaluator;
use crate::engine::messages::SnapshotQuery;
use crate::engine::runner::Runner;
use crate::error::{FurrowError, Result};
use crate::hardware::{Pump, PumpDriver};
use crate::schedule::{CronEntry, ScheduleSnapshot};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Snapshot query queue capacity.
const QUERY_CHANNEL_SIZE: usize = 8;

/// Running engine: owns the evaluator and runner tasks.
pub struct Engine {
    handle: EngineHandle,
    cancel: CancellationToken,
    evaluator: tokio::task::JoinHandle<()>,
    runner: tokio::task::JoinHandle<()>,
}

impl Engine {
    /// Wire the queues and spawn the evaluator and runner tasks.
    pub fn start<C, D>(config: &FurrowConfig, clock: C, driver: D) -> Self
    where
        C: WallClock,
        D: PumpDriver,
    {
        let tick_interval = Duration::from_secs(config.scheduler.tick_interval_secs.max(1));
        let poll_interval = Duration::from_secs(config.runner.poll_interval_secs.max(1));

        let (run_tx, run_rx) = mpsc::channel(config.channels.run_requests.max(1));
        let (update_tx, update_rx) = mpsc::channel(config.channels.schedule_updates.max(1));
        let (query_tx, query_rx) = mpsc::channel(QUERY_CHANNEL_SIZE);

        let cancel = CancellationToken::new();

        let evaluator = Evaluator::new(
            clock,
            update_rx,
            run_tx.clone(),
            query_rx,
            tick_interval,
            cancel.clone(),
        );
        // The runner's queue wait is bounded by one evaluator tick.
        let runner = Runner::new(driver, run_rx, poll_interval, tick_interval, cancel.clone());

        info!(
            tick_interval_secs = tick_interval.as_secs(),
            poll_interval_secs = poll_interval.as_secs(),
            "engine starting"
        );

        Self {
            handle: EngineHandle {
                run_tx,
                update_tx,
                query_tx,
            },
            cancel,
            evaluator: tokio::spawn(evaluator.run()),
            runner: tokio::spawn(runner.run()),
        }
    }

    /// Cloneable handle for submitting work to the engine.
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Stop both tasks and wait for them to exit.
    ///
    /// An actuation cycle in flight completes its hold and forced-off
    /// writes first; requests still queued are discarded.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.evaluator.await;
        let _ = self.runner.await;
        info!("engine stopped");
    }
}

/// Cloneable boundary surface for the engine.
#[derive(Clone)]
pub struct EngineHandle {
    run_tx: mpsc::Sender<RunRequest>,
    update_tx: mpsc::Sender<CronEntry>,
    query_tx: mpsc::Sender<SnapshotQuery>,
}

impl EngineHandle {
    /// Queue an immediate two-pump run: pump A for `a`, then pump B for
    /// `b`, strictly in that order and never overlapping.
    ///
    /// Returns the per-request enqueue outcomes; `false` means that
    /// request was dropped because the run queue was full. Callers are
    /// free to ignore them.
    ///
    /// # Errors
    ///
    /// Returns an error when either duration is zero.
    pub fn run_pumps(&self, a: Duration, b: Duration) -> Result<(bool, bool)> {
        if a.is_zero() || b.is_zero() {
            return Err(FurrowError::Request(
                "run durations must be positive".to_owned(),
            ));
        }

        let first = self.run_tx.try_send(RunRequest::solo(Pump::A, a)).is_ok();
        let second = self.run_tx.try_send(RunRequest::solo(Pump::B, b)).is_ok();
        Ok((first, second))
    }

    /// Queue a schedule entry for insertion on an upcoming evaluator
    /// tick; one queued update is applied per tick, in submission order.
    ///
    /// Returns `false` when the update queue was full and the entry was
    /// dropped.
    pub fn submit_entry(&self, entry: CronEntry) -> bool {
        self.update_tx.try_send(entry).is_ok()
    }

    /// Read-only copy of the schedule table, answered by the evaluator
    /// between ticks.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine has stopped.
    pub async fn schedule_snapshot(&self) -> Result<ScheduleSnapshot> {
        let (respond_to, response) = oneshot::channel();
        self.query_tx
            .send(SnapshotQuery { respond_to })
            .await
            .map_err(|_| FurrowError::Engine("engine not running".to_owned()))?;
        response
            .await
            .map_err(|_| FurrowError::Engine("engine not running".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::hardware::PumpState;

    fn make_handle(
        run_capacity: usize,
        update_capacity: usize,
    ) -> (
        EngineHandle,
        mpsc::Receiver<RunRequest>,
        mpsc::Receiver<CronEntry>,
        mpsc::Receiver<SnapshotQuery>,
    ) {
        let (run_tx, run_rx) = mpsc::channel(run_capacity);
        let (update_tx, update_rx) = mpsc::channel(update_capacity);
        let (query_tx, query_rx) = mpsc::channel(QUERY_CHANNEL_SIZE);
        let handle = EngineHandle {
            run_tx,
            update_tx,
            query_tx,
        };
        (handle, run_rx, update_rx, query_rx)
    }

    #[test]
    fn run_pumps_queues_two_requests_in_order() {
        let (handle, mut run_rx, _update_rx, _query_rx) = make_handle(8, 8);

        let outcome = handle
            .run_pumps(Duration::from_secs(30), Duration::from_secs(45))
            .expect("valid durations");
        assert_eq!(outcome, (true, true));

        let first = run_rx.try_recv().expect("first request");
        assert_eq!(first.pump_a, PumpState::On);
        assert_eq!(first.hold, Duration::from_secs(30));

        let second = run_rx.try_recv().expect("second request");
        assert_eq!(second.pump_b, PumpState::On);
        assert_eq!(second.hold, Duration::from_secs(45));
    }

    #[test]
    fn run_pumps_rejects_zero_durations() {
        let (handle, mut run_rx, _update_rx, _query_rx) = make_handle(8, 8);

        assert!(
            handle
                .run_pumps(Duration::ZERO, Duration::from_secs(1))
                .is_err()
        );
        assert!(
            handle
                .run_pumps(Duration::from_secs(1), Duration::ZERO)
                .is_err()
        );
        assert!(run_rx.try_recv().is_err(), "nothing queued on rejection");
    }

    #[test]
    fn run_pumps_reports_drop_when_queue_full() {
        let (handle, _run_rx, _update_rx, _query_rx) = make_handle(1, 8);

        let outcome = handle
            .run_pumps(Duration::from_secs(30), Duration::from_secs(45))
            .expect("valid durations");
        assert_eq!(outcome, (true, false));
    }

    #[test]
    fn submit_entry_reports_queue_full() {
        let (handle, _run_rx, _update_rx, _query_rx) = make_handle(8, 1);
        let entry = || {
            CronEntry::new(
                Pump::A,
                PumpState::On,
                Duration::from_secs(60),
                7,
                30,
            )
            .expect("valid entry")
        };

        assert!(handle.submit_entry(entry()));
        assert!(!handle.submit_entry(entry()));
    }

    #[tokio::test]
    async fn snapshot_query_errors_when_engine_stopped() {
        let (handle, _run_rx, _update_rx, query_rx) = make_handle(8, 8);
        drop(query_rx);

        let result = handle.schedule_snapshot().await;
        assert!(matches!(result, Err(FurrowError::Engine(_))));
    }
}
