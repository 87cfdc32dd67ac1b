//! Actuation consumer.
//!
//! Pulls run requests off the queue and executes them one at a time:
//! set both outputs, hold, force both off. A cycle in flight always
//! completes; shutdown only interrupts the idle waits, so outputs are
//! never abandoned mid-on.

use crate::engine::messages::RunRequest;
use crate::hardware::{Pump, PumpDriver, PumpState};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Sequential task that executes run requests against the pump outputs.
pub(crate) struct Runner<D: PumpDriver> {
    driver: D,
    run_rx: mpsc::Receiver<RunRequest>,
    poll_interval: Duration,
    receive_timeout: Duration,
    cancel: CancellationToken,
}

impl<D: PumpDriver> Runner<D> {
    pub(crate) fn new(
        driver: D,
        run_rx: mpsc::Receiver<RunRequest>,
        poll_interval: Duration,
        receive_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            driver,
            run_rx,
            poll_interval,
            receive_timeout,
            cancel,
        }
    }

    /// Run until cancelled.
    ///
    /// Exactly one request is serviced end-to-end before the next one is
    /// dequeued; a request arriving mid-cycle waits in the queue.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = sleep(self.poll_interval) => {}
            }

            let request = tokio::select! {
                () = self.cancel.cancelled() => break,
                received = timeout(self.receive_timeout, self.run_rx.recv()) => {
                    match received {
                        Ok(Some(request)) => request,
                        // All senders dropped; nothing can arrive anymore.
                        Ok(None) => break,
                        // Nothing queued within the window; idle again.
                        Err(_) => continue,
                    }
                }
            };

            self.service(request).await;
        }

        info!("runner stopping");
    }

    /// Execute one cycle: set both outputs, hold, force both off.
    ///
    /// Not cancellable; the hold must elapse so the forced-off writes
    /// always run.
    async fn service(&mut self, request: RunRequest) {
        info!(
            pump_a = %request.pump_a,
            pump_b = %request.pump_b,
            hold_secs = request.hold.as_secs(),
            "run cycle started"
        );

        self.driver.set(Pump::A, request.pump_a);
        self.driver.set(Pump::B, request.pump_b);
        sleep(request.hold).await;
        self.driver.set(Pump::A, PumpState::Off);
        self.driver.set(Pump::B, PumpState::Off);

        debug!("run cycle complete");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::test_utils::RecordingDriver;
    use tokio::time::Instant;

    const POLL: Duration = Duration::from_secs(2);
    const RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

    fn spawn_runner(
        driver: RecordingDriver,
        run_rx: mpsc::Receiver<RunRequest>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(Runner::new(driver, run_rx, POLL, RECEIVE_TIMEOUT, cancel).run())
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_sets_holds_and_forces_off() {
        let (run_tx, run_rx) = mpsc::channel(4);
        let driver = RecordingDriver::new();
        let cancel = CancellationToken::new();
        let handle = spawn_runner(driver.clone(), run_rx, cancel.clone());

        let start = Instant::now();
        run_tx
            .try_send(RunRequest::solo(Pump::A, Duration::from_secs(30)))
            .expect("send");
        tokio::time::sleep(Duration::from_secs(40)).await;

        let transitions = driver.transitions();
        assert_eq!(transitions.len(), 4);

        // Poll delay, then both outputs written together.
        assert_eq!(transitions[0].pump, Pump::A);
        assert_eq!(transitions[0].state, PumpState::On);
        assert_eq!(transitions[0].at - start, Duration::from_secs(2));
        assert_eq!(transitions[1].pump, Pump::B);
        assert_eq!(transitions[1].state, PumpState::Off);

        // Hold elapses, then both forced off.
        assert_eq!(transitions[2].state, PumpState::Off);
        assert_eq!(transitions[2].at - start, Duration::from_secs(32));
        assert_eq!(transitions[3].state, PumpState::Off);
        assert_eq!(transitions[3].at - start, Duration::from_secs(32));

        cancel.cancel();
        handle.await.expect("runner exits");
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_waits_for_first_cycle() {
        let (run_tx, run_rx) = mpsc::channel(4);
        let driver = RecordingDriver::new();
        let cancel = CancellationToken::new();
        let handle = spawn_runner(driver.clone(), run_rx, cancel.clone());

        run_tx
            .try_send(RunRequest::solo(Pump::A, Duration::from_secs(30)))
            .expect("send");
        run_tx
            .try_send(RunRequest::solo(Pump::B, Duration::from_secs(45)))
            .expect("send");
        tokio::time::sleep(Duration::from_secs(100)).await;

        let transitions = driver.transitions();
        assert_eq!(transitions.len(), 8);

        // Replaying the transitions never shows both pumps on at once.
        let mut a_on = false;
        let mut b_on = false;
        for t in &transitions {
            match t.pump {
                Pump::A => a_on = t.state == PumpState::On,
                Pump::B => b_on = t.state == PumpState::On,
            }
            assert!(!(a_on && b_on), "both pumps on at {:?}", t.at);
        }
        assert!(!a_on && !b_on, "pumps left on after final cycle");

        cancel.cancel();
        handle.await.expect("runner exits");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_idle_exits_without_output() {
        let (_run_tx, run_rx) = mpsc::channel::<RunRequest>(4);
        let driver = RecordingDriver::new();
        let cancel = CancellationToken::new();
        let handle = spawn_runner(driver.clone(), run_rx, cancel.clone());

        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
        handle.await.expect("runner exits");

        assert!(driver.transitions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn inflight_cycle_completes_after_cancel() {
        let (run_tx, run_rx) = mpsc::channel(4);
        let driver = RecordingDriver::new();
        let cancel = CancellationToken::new();
        let handle = spawn_runner(driver.clone(), run_rx, cancel.clone());

        let start = Instant::now();
        run_tx
            .try_send(RunRequest::solo(Pump::A, Duration::from_secs(60)))
            .expect("send");

        // Cancel mid-hold; the forced-off writes must still land.
        tokio::time::sleep(Duration::from_secs(10)).await;
        cancel.cancel();
        handle.await.expect("runner exits");

        let transitions = driver.transitions();
        assert_eq!(transitions.len(), 4);
        assert_eq!(transitions[2].at - start, Duration::from_secs(62));
        assert_eq!(transitions[2].state, PumpState::Off);
        assert_eq!(transitions[3].state, PumpState::Off);
    }
}
