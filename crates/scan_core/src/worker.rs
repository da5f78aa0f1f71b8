//! Periodic generation worker with a single-slot handoff.
//!
//! The worker sleeps through a warm-up delay, then produces one batch per
//! interval and pushes it into a `bounded(1)` channel. While the render
//! context has not taken the previous batch the worker blocks, so at most one
//! finished batch waits in the slot and the next cycle starts only after the
//! handoff completes.
//!
//! Cancellation is a zero-capacity channel whose sender is dropped. Every
//! wait `select!`s on it, so cancelling takes effect within the current
//! batch at the latest.

use crate::error::Result;
use crate::generator::PointGenerator;
use crate::point::PointRecord;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

pub type Batch = Vec<PointRecord>;

/// Timing of the generation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    /// Delay between activation and the first batch.
    pub warmup: Duration,
    /// Target period between batch starts.
    pub interval: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            warmup: Duration::from_millis(2000),
            interval: Duration::from_millis(33),
        }
    }
}

/// Creates the single-slot handoff between the worker and the render context.
pub fn handoff() -> (Sender<Batch>, Receiver<Batch>) {
    bounded(1)
}

/// A running generation thread. Dropping it cancels and joins.
pub struct GenerationWorker {
    cancel: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl GenerationWorker {
    /// Starts a worker that feeds `tx` on `cadence`, beginning with a full
    /// warm-up.
    pub fn spawn(generator: PointGenerator, cadence: Cadence, tx: Sender<Batch>) -> Result<Self> {
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let handle = thread::Builder::new()
            .name("scan-generator".into())
            .spawn(move || run(generator, cadence, tx, cancel_rx))?;

        log::info!(
            "Generation worker started (warmup={:?}, interval={:?})",
            cadence.warmup,
            cadence.interval
        );
        Ok(Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Invalidates the cancellation token and waits for the thread to exit.
    pub fn cancel(&mut self) {
        // Dropping the sender disconnects every pending `select!`.
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Generation worker panicked");
            } else {
                log::info!("Generation worker stopped");
            }
        }
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sleeps for `dur` unless cancelled first. Returns `false` when cancelled.
fn wait(cancel: &Receiver<()>, dur: Duration) -> bool {
    select! {
        recv(cancel) -> _ => false,
        default(dur) => true,
    }
}

fn run(mut generator: PointGenerator, cadence: Cadence, tx: Sender<Batch>, cancel: Receiver<()>) {
    if !wait(&cancel, cadence.warmup) {
        return;
    }

    let mut last_cycle: Option<Instant> = None;
    loop {
        let cycle_start = Instant::now();
        if let Some(prev) = last_cycle {
            let dt = cycle_start.duration_since(prev).as_secs_f32();
            if dt > 0.0 {
                log::trace!("Generation rate: {:.1} batches/s", 1.0 / dt);
            }
        }
        last_cycle = Some(cycle_start);

        let batch = generator.next_batch();
        log::debug!(
            "Generated {} points in {:?}",
            batch.len(),
            cycle_start.elapsed()
        );

        select! {
            send(tx, batch) -> res => {
                if res.is_err() {
                    log::debug!("Render context hung up; generation worker exiting");
                    return;
                }
            }
            recv(cancel) -> _ => return,
        }

        let remaining = cadence.interval.saturating_sub(cycle_start.elapsed());
        if !wait(&cancel, remaining) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast(warmup_ms: u64) -> Cadence {
        Cadence {
            warmup: Duration::from_millis(warmup_ms),
            interval: Duration::from_millis(1),
        }
    }

    #[test]
    fn delivers_batches_after_warmup() {
        let (tx, rx) = handoff();
        let started = Instant::now();
        let _worker =
            GenerationWorker::spawn(PointGenerator::with_seed(64, 1), fast(50), tx).unwrap();

        let batch = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(batch.len(), 64);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn at_most_one_batch_waits_in_the_slot() {
        let (tx, rx) = handoff();
        let _worker =
            GenerationWorker::spawn(PointGenerator::with_seed(32, 2), fast(0), tx).unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(rx.len() <= 1);
    }

    #[test]
    fn cancel_during_warmup_delivers_nothing() {
        let (tx, rx) = handoff();
        let mut worker =
            GenerationWorker::spawn(PointGenerator::with_seed(32, 3), fast(10_000), tx).unwrap();
        let started = Instant::now();
        worker.cancel();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!worker.is_running());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cancel_unblocks_a_producer_waiting_on_a_full_slot() {
        let (tx, rx) = handoff();
        let mut worker =
            GenerationWorker::spawn(PointGenerator::with_seed(32, 4), fast(0), tx).unwrap();
        // Let the slot fill and the worker block on the second send.
        thread::sleep(Duration::from_millis(50));
        worker.cancel();
        assert!(!worker.is_running());
        drop(rx);
    }

    #[test]
    fn dropped_receiver_stops_the_worker() {
        let (tx, rx) = handoff();
        let worker =
            GenerationWorker::spawn(PointGenerator::with_seed(32, 5), fast(0), tx).unwrap();
        drop(rx);
        let deadline = Instant::now() + Duration::from_secs(5);
        while worker.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!worker.is_running());
    }
}
