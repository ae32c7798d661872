//! Background sensor sampling utilities.
//!
//! Spawns a thread that owns the `StepSensor`, forwards readings over an
//! unbounded channel, and tracks the last-ok timestamp for stall reporting.
//! Event-driven and paced variants are provided. The channel is unbounded
//! because discrete-detector events each carry a count and must not be
//! dropped; cumulative readings may still be coalesced by the consumer via
//! `latest`, since each one is an absolute total.
//!
//! Safety: Each `Sampler` spawns exactly one thread that is automatically
//! shut down when the `Sampler` is dropped, preventing thread leaks.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use stride_traits::clock::Clock;
use stride_traits::{StepReading, StepSensor};

pub struct Sampler {
    rx: xch::Receiver<StepReading>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Rate-paced sampler: poll the sensor at `hz`.
    pub fn spawn<S: StepSensor + Send + 'static, C: Clock + Send + Sync + 'static>(
        mut sensor: S,
        hz: u32,
        timeout: Duration,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let period = Duration::from_micros(crate::util::period_us(hz));
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("Sampler thread received shutdown signal");
                    break;
                }

                match sensor.read(timeout) {
                    Ok(reading) => {
                        // If send fails, consumer is gone; exit gracefully
                        if tx.send(reading).is_err() {
                            tracing::debug!("Sampler consumer disconnected, exiting thread");
                            break;
                        }
                        let now = clock.ms_since(epoch);
                        last_ok_clone.store(now, Ordering::Relaxed);
                    }
                    Err(_) => {
                        // Transient sensor failure; absence is not an error
                    }
                }

                // Check shutdown before sleep to avoid unnecessary delay
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(period);
            }
            tracing::trace!("Sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Event-driven sampler: rely on the sensor's own delivery timing and do
    /// not add extra sleeps. `sensor.read(timeout)` should block until a
    /// step delivery is ready or the timeout expires.
    pub fn spawn_event<S: StepSensor + Send + 'static, C: Clock + Send + Sync + 'static>(
        mut sensor: S,
        timeout: Duration,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("Sampler event thread received shutdown signal");
                    break;
                }

                match sensor.read(timeout) {
                    Ok(reading) => {
                        if tx.send(reading).is_err() {
                            tracing::debug!("Sampler event consumer disconnected, exiting thread");
                            break;
                        }
                        let now = clock.ms_since(epoch);
                        last_ok_clone.store(now, Ordering::Relaxed);
                    }
                    Err(_) => {
                        // On timeout or transient error, just continue
                    }
                }
                // No sleep here: next iteration blocks in read() until the
                // sensor has something, but check shutdown right after.
            }
            tracing::trace!("Sampler event thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Latest pending reading, discarding older ones. Only correct for
    /// cumulative sources, where every reading is an absolute total.
    pub fn latest(&self) -> Option<StepReading> {
        self.rx.try_iter().last()
    }

    /// Drain every pending reading in arrival order. Required for discrete
    /// detectors, where each reading carries a count.
    pub fn drain(&self) -> xch::TryIter<'_, StepReading> {
        self.rx.try_iter()
    }

    /// Stop the sampling thread and return any readings still in flight.
    /// Joining first guarantees no send races the drain, so the caller's
    /// final flush really does see the last observed value.
    pub fn stop(mut self) -> Vec<StepReading> {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "Sampler thread panicked during shutdown");
            }
        }
        self.rx.try_iter().collect()
    }

    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// Convenience helper: compute stall using this sampler's epoch and a
    /// real monotonic clock.
    pub fn stalled_for_now(&self) -> u64 {
        let now_ms = {
            let dur = Instant::now().saturating_duration_since(self.epoch);
            let ms = dur.as_millis();
            (ms.min(u128::from(u64::MAX))) as u64
        };
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread will exit:
        // 1. Immediately if it's between reads (checking shutdown flag)
        // 2. After the current sensor.read() completes (up to the sensor timeout)
        // 3. Immediately after read if it was in sleep (shutdown check before sleep)
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Sampler thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "Sampler thread panicked during shutdown");
                }
            }
        }
    }
}
