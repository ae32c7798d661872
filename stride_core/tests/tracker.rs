use std::sync::{Arc, Mutex};

use stride_core::mocks::{MemStore, NullSink};
use stride_core::persist::{KEY_LAST_DAY, KEY_LAST_VALUE, KEY_STEPS_TODAY, load_state};
use stride_core::{DailyTracker, TrackerEvent, TrackerStatus};
use stride_traits::{StateStore, StepReading, StepSink};

/// Sink that records every emission.
#[derive(Clone, Default)]
struct RecordingSink {
    emitted: Arc<Mutex<Vec<u32>>>,
}

impl RecordingSink {
    fn values(&self) -> Vec<u32> {
        self.emitted.lock().unwrap().clone()
    }
}

impl StepSink for RecordingSink {
    fn emit(&self, steps_today: u32) {
        self.emitted.lock().unwrap().push(steps_today);
    }
}

/// Store whose writes fail on demand while reads keep working.
#[derive(Default)]
struct FlakyStore {
    inner: MemStore,
    failing: bool,
}

impl StateStore for FlakyStore {
    fn get_i64(&self, key: &str) -> Option<i64> {
        self.inner.get_i64(key)
    }
    fn get_f64(&self, key: &str) -> Option<f64> {
        self.inner.get_f64(key)
    }
    fn put_i64(
        &mut self,
        key: &str,
        value: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.failing {
            return Err("write failed".into());
        }
        self.inner.put_i64(key, value)
    }
    fn put_f64(
        &mut self,
        key: &str,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.failing {
            return Err("write failed".into());
        }
        self.inner.put_f64(key, value)
    }
    fn remove(&mut self, key: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.remove(key)
    }
}

#[test]
fn builder_requires_store_and_sink() {
    let err = DailyTracker::<MemStore, NullSink>::builder()
        .build()
        .unwrap_err();
    assert!(format!("{err}").contains("missing state store"));

    let err = DailyTracker::<MemStore, NullSink>::builder()
        .with_store(MemStore::default())
        .build()
        .unwrap_err();
    assert!(format!("{err}").contains("missing step sink"));
}

#[test]
fn builder_rejects_out_of_range_day() {
    let err = DailyTracker::builder()
        .with_store(MemStore::default())
        .with_sink(NullSink)
        .with_today(400)
        .build()
        .unwrap_err();
    assert!(format!("{err}").contains("day-of-year"));
}

#[test]
fn apply_persists_write_through() {
    let mut tracker = DailyTracker::new(MemStore::default(), NullSink, 100);
    tracker.apply(StepReading::counter(5000.0), 100);
    tracker.apply(StepReading::counter(5120.0), 100);

    // Every field is durable after each callback, not just at shutdown.
    assert_eq!(tracker.state().steps_today, 120);
    // Reload from the store as a new process would.
    let loaded = load_state(tracker.store(), 100);
    assert_eq!(loaded.steps_today, 120);
    assert_eq!(loaded.last_value, Some(5120.0));
}

#[test]
fn start_event_emits_current_count() {
    let mut store = MemStore::default();
    store.put_i64(KEY_STEPS_TODAY, 250).unwrap();
    store.put_i64(KEY_LAST_DAY, 80).unwrap();

    let sink = RecordingSink::default();
    let mut tracker = DailyTracker::new(store, sink.clone(), 80);
    let status = tracker.handle(TrackerEvent::Start, 80);
    assert_eq!(status, TrackerStatus::Tracking { steps_today: 250 });
    assert_eq!(sink.values(), vec![250]);
}

#[test]
fn readings_emit_and_stop_flushes() {
    let sink = RecordingSink::default();
    let mut tracker = DailyTracker::new(MemStore::default(), sink.clone(), 100);

    tracker.handle(TrackerEvent::Start, 100);
    tracker.handle(TrackerEvent::Reading(StepReading::counter(5000.0)), 100);
    tracker.handle(TrackerEvent::Reading(StepReading::counter(5120.0)), 100);
    let status = tracker.handle(TrackerEvent::Stop, 100);

    assert_eq!(status, TrackerStatus::Stopped { steps_today: 120 });
    assert_eq!(sink.values(), vec![0, 0, 120]);
}

#[test]
fn persistence_failure_is_tolerated_and_counted() {
    let store = FlakyStore {
        failing: true,
        ..FlakyStore::default()
    };
    let mut tracker = DailyTracker::new(store, NullSink, 100);

    let steps = tracker.apply(StepReading::detected(3.0), 100);
    // In-memory state stays authoritative.
    assert_eq!(steps, 3);
    assert_eq!(tracker.persist_failures(), 1);

    let steps = tracker.apply(StepReading::detected(2.0), 100);
    assert_eq!(steps, 5);
    assert_eq!(tracker.persist_failures(), 2);
}

#[test]
fn query_persists_lazy_rollover_without_double_count() {
    let mut tracker = DailyTracker::new(MemStore::default(), NullSink, 100);
    tracker.apply(StepReading::counter(5000.0), 100);
    tracker.apply(StepReading::counter(5300.0), 100);
    assert_eq!(tracker.state().steps_today, 300);

    // Query on the next day: resets, and the reset is durable.
    assert_eq!(tracker.steps_today(101), 0);
    let loaded = load_state(tracker.store(), 101);
    assert_eq!(loaded.steps_today, 0);
    assert_eq!(loaded.day, 101);

    // The next reading must seed a fresh window, not replay the old delta.
    let steps = tracker.apply(StepReading::counter(5350.0), 101);
    assert_eq!(steps, 0);
    let steps = tracker.apply(StepReading::counter(5360.0), 101);
    assert_eq!(steps, 10);
}

#[test]
fn reset_zeroes_count_and_persists() {
    let mut tracker = DailyTracker::new(MemStore::default(), NullSink, 100);
    tracker.apply(StepReading::counter(100.0), 100);
    tracker.apply(StepReading::counter(400.0), 100);
    assert_eq!(tracker.state().steps_today, 300);

    tracker.reset(100);
    assert_eq!(tracker.state().steps_today, 0);

    let store = tracker.store();
    assert_eq!(store.get_i64(KEY_STEPS_TODAY), Some(0));
    assert_eq!(store.get_i64(KEY_LAST_DAY), Some(100));
    // Resume point survives the reset.
    assert_eq!(store.get_f64(KEY_LAST_VALUE), Some(400.0));
}
