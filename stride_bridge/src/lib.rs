//! Process-local event bridge for daily step updates.
//!
//! The application layer subscribes to a named bus and receives
//! fire-and-forget `StepEvent`s. Emission never blocks the sensor callback
//! path and never fails: with no listener attached the event is simply
//! dropped, and the next reading's emission covers the gap. Disconnected
//! subscribers are pruned on the following emit.

use std::sync::{Arc, Mutex};

use crossbeam_channel as xch;
use stride_traits::StepSink;

/// Name of the update stream, mirrored in log output so listeners and
/// emitters can be correlated.
pub const STEP_EVENT: &str = "StepUpdate";

/// One delivered update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    pub steps_today: u32,
}

/// Fan-out bus carrying the current daily count to zero or more listeners.
/// Cheap to clone; all clones share the subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<xch::Sender<StepEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener. Events emitted while nobody held the receiver are
    /// gone; delivery starts with the next emission.
    pub fn subscribe(&self) -> xch::Receiver<StepEvent> {
        let (tx, rx) = xch::unbounded();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    /// Number of currently attached listeners (best-effort; disconnected
    /// receivers are only pruned on emit).
    pub fn listener_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}

impl StepSink for EventBus {
    fn emit(&self, steps_today: u32) {
        let event = StepEvent { steps_today };
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| match tx.try_send(event) {
                Ok(()) => true,
                Err(xch::TrySendError::Disconnected(_)) => false,
                Err(xch::TrySendError::Full(_)) => true,
            });
            tracing::trace!(event = STEP_EVENT, steps_today, listeners = subs.len(), "step event emitted");
        }
    }
}
