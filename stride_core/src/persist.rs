//! Write-through persistence of accumulator state.
//!
//! The store schema is four string keys with documented sentinels: missing
//! counts read back as 0, missing float fields as −1.0. No migration logic
//! beyond that.

use stride_traits::StateStore;

use crate::accumulator::AccumulatorState;
use crate::error::TrackerError;

pub const KEY_STEPS_TODAY: &str = "steps_today";
pub const KEY_LAST_DAY: &str = "last_day";
pub const KEY_INITIAL_VALUE: &str = "initial_sensor_value";
pub const KEY_LAST_VALUE: &str = "last_sensor_value";

/// Sentinel stored for absent float fields.
pub const VALUE_UNSET: f64 = -1.0;

/// Load persisted state, defaulting missing keys. The baseline is
/// deliberately not reloaded: a process restart opens a new accumulation
/// window, and `last_value` alone carries the same-day resume point.
pub fn load_state<K: StateStore>(store: &K, today: u16) -> AccumulatorState {
    let steps_today = store
        .get_i64(KEY_STEPS_TODAY)
        .unwrap_or(0)
        .clamp(0, i64::from(u32::MAX)) as u32;
    let day = store
        .get_i64(KEY_LAST_DAY)
        .map_or(today, |d| d.clamp(0, i64::from(u16::MAX)) as u16);
    let last_value = store.get_f64(KEY_LAST_VALUE).filter(|v| *v >= 0.0);

    AccumulatorState {
        baseline: None,
        last_value,
        steps_today,
        day,
    }
}

/// Persist every field, then flush. Synchronous and best-effort durable;
/// the caller decides whether a failure is fatal (it never is here).
pub fn save_state<K: StateStore>(
    store: &mut K,
    state: &AccumulatorState,
) -> std::result::Result<(), TrackerError> {
    store
        .put_i64(KEY_STEPS_TODAY, i64::from(state.steps_today))
        .map_err(persistence)?;
    store
        .put_i64(KEY_LAST_DAY, i64::from(state.day))
        .map_err(persistence)?;
    store
        .put_f64(KEY_INITIAL_VALUE, state.baseline.unwrap_or(VALUE_UNSET))
        .map_err(persistence)?;
    store
        .put_f64(KEY_LAST_VALUE, state.last_value.unwrap_or(VALUE_UNSET))
        .map_err(persistence)?;
    store.flush().map_err(persistence)
}

fn persistence(e: Box<dyn std::error::Error + Send + Sync>) -> TrackerError {
    TrackerError::Persistence(e.to_string())
}
