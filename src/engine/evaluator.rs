//! Periodic schedule evaluation.
//!
//! The evaluator owns the schedule table. Each tick applies at most one
//! queued schedule update, then fires every entry whose hour and minute
//! match the wall clock and has not already fired today. Snapshot
//! queries are answered between ticks so the table never needs a lock.

use crate::clock::WallClock;
use crate::engine::messages::{RunRequest, SnapshotQuery};
use crate::schedule::{CronEntry, ScheduleStore};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Periodic task that drives the schedule table.
pub(crate) struct Evaluator<C: WallClock> {
    store: ScheduleStore,
    clock: C,
    update_rx: mpsc::Receiver<CronEntry>,
    run_tx: mpsc::Sender<RunRequest>,
    query_rx: mpsc::Receiver<SnapshotQuery>,
    tick_interval: Duration,
    cancel: CancellationToken,
}

impl<C: WallClock> Evaluator<C> {
    pub(crate) fn new(
        clock: C,
        update_rx: mpsc::Receiver<CronEntry>,
        run_tx: mpsc::Sender<RunRequest>,
        query_rx: mpsc::Receiver<SnapshotQuery>,
        tick_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store: ScheduleStore::new(),
            clock,
            update_rx,
            run_tx,
            query_rx,
            tick_interval,
            cancel,
        }
    }

    /// Run until cancelled.
    pub(crate) async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick_interval);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("evaluator stopping");
                    break;
                }
                _ = interval.tick() => self.tick(),
                Some(query) = self.query_rx.recv() => {
                    let _ = query.respond_to.send(self.store.snapshot());
                }
            }
        }
    }

    /// One evaluation pass: apply at most one pending schedule update,
    /// then fire every due entry.
    ///
    /// A fired entry is marked as having run today whether or not its
    /// run request fit in the queue; a dropped request is not retried.
    fn tick(&mut self) {
        if let Ok(entry) = self.update_rx.try_recv() {
            info!(entry = %entry, "schedule entry installed");
            self.store.insert(entry);
        }

        let now = self.clock.now();
        for entry in self.store.due_entries_mut(now) {
            let request = RunRequest::solo(entry.pump(), entry.duration());
            if self.run_tx.try_send(request).is_ok() {
                info!(entry = %entry, at = %now, "schedule entry fired");
            } else {
                warn!(entry = %entry, at = %now, "run queue full, dropping scheduled run");
            }
            entry.mark_fired(now);
        }
    }
}
