//! The stateful daily tracker.
//!
//! Owns the accumulator state, the write-through persistence policy, and
//! fire-and-forget emission. Collaborators are injected at construction;
//! nothing here reaches into process-wide state. Driven either directly via
//! `apply`/`steps_today`/`reset` or through the `{Start, Reading, Stop}`
//! event machine, which decouples the engine from any hosting lifecycle.

use stride_traits::{StateStore, StepReading, StepSink};

use crate::accumulator::{self, AccumulatorState};
use crate::error::BuildError;
use crate::persist::{load_state, save_state};
use crate::status::TrackerStatus;

/// Control events driving the tracker, replacing platform lifecycle
/// callbacks as the only control flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerEvent {
    /// Begin tracking: reload state and emit the current count so a freshly
    /// attached listener sees a value before the first reading arrives.
    Start,
    /// One sensor delivery.
    Reading(StepReading),
    /// End tracking: final persistence flush with the last observed value.
    Stop,
}

/// The accumulator engine. Single-threaded by contract: each event is
/// processed to completion (read, compute, persist, emit) before the next.
pub struct DailyTracker<K: StateStore, E: StepSink> {
    store: K,
    sink: E,
    state: AccumulatorState,
    persist_failures: u64,
}

impl<K: StateStore, E: StepSink> core::fmt::Debug for DailyTracker<K, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DailyTracker")
            .field("steps_today", &self.state.steps_today)
            .field("day", &self.state.day)
            .field("persist_failures", &self.persist_failures)
            .finish()
    }
}

impl<K: StateStore, E: StepSink> DailyTracker<K, E> {
    pub fn builder() -> TrackerBuilder<K, E> {
        TrackerBuilder::new()
    }

    /// Build a tracker over `store` and `sink`, loading any persisted state.
    pub fn new(store: K, sink: E, today: u16) -> Self {
        let state = load_state(&store, today);
        Self {
            store,
            sink,
            state,
            persist_failures: 0,
        }
    }

    /// Handle one control event. `today` is the caller's current local
    /// day-of-year.
    pub fn handle(&mut self, event: TrackerEvent, today: u16) -> TrackerStatus {
        match event {
            TrackerEvent::Start => {
                self.state = load_state(&self.store, today);
                let steps_today = self.steps_today(today);
                self.sink.emit(steps_today);
                TrackerStatus::Tracking { steps_today }
            }
            TrackerEvent::Reading(reading) => TrackerStatus::Tracking {
                steps_today: self.apply(reading, today),
            },
            TrackerEvent::Stop => {
                self.flush();
                TrackerStatus::Stopped {
                    steps_today: self.state.steps_today,
                }
            }
        }
    }

    /// Apply one sensor reading: advance the pure accumulator, persist
    /// write-through, emit. Returns the resulting daily count.
    pub fn apply(&mut self, reading: StepReading, today: u16) -> u32 {
        let (next, emitted) = accumulator::advance(self.state, reading, today);
        self.state = next;
        self.persist();
        self.sink.emit(emitted);
        emitted
    }

    /// Current daily count. A stale stored day is reset lazily and the reset
    /// is persisted; the window markers are cleared so the next cumulative
    /// reading seeds a fresh baseline instead of double-counting.
    pub fn steps_today(&mut self, today: u16) -> u32 {
        if self.state.day != today {
            self.state.steps_today = 0;
            self.state.day = today;
            self.state.baseline = None;
            self.state.last_value = None;
            self.persist();
        }
        self.state.steps_today
    }

    /// Explicit user-invoked reset.
    pub fn reset(&mut self, today: u16) {
        self.state = accumulator::reset(self.state, today);
        self.persist();
    }

    /// Final persistence flush; called at teardown with the last observed
    /// sensor value already folded into the state.
    pub fn flush(&mut self) {
        self.persist();
    }

    /// Read-only snapshot of the current state.
    pub fn state(&self) -> &AccumulatorState {
        &self.state
    }

    /// Borrow the underlying store (diagnostics and tests).
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Number of persistence failures tolerated so far.
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    fn persist(&mut self) {
        if let Err(e) = save_state(&mut self.store, &self.state) {
            self.persist_failures = self.persist_failures.saturating_add(1);
            tracing::warn!(
                error = %e,
                failures = self.persist_failures,
                "state persist failed; in-memory state remains authoritative"
            );
        }
    }
}

/// Builder for `DailyTracker`, mirroring how the engine is assembled from
/// config and injected collaborators.
pub struct TrackerBuilder<K: StateStore, E: StepSink> {
    store: Option<K>,
    sink: Option<E>,
    today: Option<u16>,
}

impl<K: StateStore, E: StepSink> Default for TrackerBuilder<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateStore, E: StepSink> TrackerBuilder<K, E> {
    pub fn new() -> Self {
        Self {
            store: None,
            sink: None,
            today: None,
        }
    }

    pub fn with_store(mut self, store: K) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_sink(mut self, sink: E) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Override the day used for the initial state load (defaults to the
    /// local day-of-year).
    pub fn with_today(mut self, day: u16) -> Self {
        self.today = Some(day);
        self
    }

    pub fn build(self) -> crate::error::Result<DailyTracker<K, E>> {
        let store = self
            .store
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStore))?;
        let sink = self
            .sink
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSink))?;
        let today = match self.today {
            Some(d) => {
                if !(1..=366).contains(&d) {
                    return Err(eyre::Report::new(BuildError::InvalidConfig(
                        "day-of-year out of range",
                    )));
                }
                d
            }
            None => crate::util::local_day_of_year(),
        };
        Ok(DailyTracker::new(store, sink, today))
    }
}
