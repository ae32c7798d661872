//! The pure daily-step transition function.
//!
//! Everything stateful in this system reduces to `advance`: a pure function
//! over `(prior state, reading, day)` returning the next state and the count
//! to emit. Keeping it pure makes the discontinuity and rollover policies
//! single, unit-testable branches.

use stride_traits::{SourceKind, StepReading};

/// Sentinel for "no day recorded yet" (real ordinals are 1..=366).
pub const DAY_UNSET: u16 = 0;

/// The only entity in the system. Mutated exclusively through `advance`,
/// `reset`, and the tracker's lazy day rollover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatorState {
    /// Cumulative sensor value at the start of the current accumulation
    /// window. Absent until the first reading of the window; never reloaded
    /// across process restarts (a restart opens a new window).
    pub baseline: Option<f64>,
    /// Most recent cumulative value seen. Survives restarts and is what
    /// makes same-day resume work.
    pub last_value: Option<f64>,
    /// Steps accumulated for `day`. Non-negative by construction.
    pub steps_today: u32,
    /// Local day-of-year this state is tracking.
    pub day: u16,
}

impl AccumulatorState {
    /// State with no history, tracking `day`.
    pub fn fresh(day: u16) -> Self {
        Self {
            baseline: None,
            last_value: None,
            steps_today: 0,
            day,
        }
    }
}

/// Apply one sensor reading. Returns the next state and the daily count to
/// emit (always the resulting `steps_today`).
pub fn advance(prior: AccumulatorState, reading: StepReading, today: u16) -> (AccumulatorState, u32) {
    let mut state = prior;

    if state.day != today {
        state.steps_today = 0;
        state.day = today;
        if reading.kind == SourceKind::CumulativeCounter {
            // The old window belongs to the prior day. Discard it entirely so
            // the current reading seeds a fresh baseline with zero delta.
            state.baseline = None;
            state.last_value = None;
        }
    }

    match reading.kind {
        SourceKind::DiscreteDetector => {
            state.steps_today = state.steps_today.saturating_add(whole_steps(reading.value));
        }
        SourceKind::CumulativeCounter => match (state.baseline, state.last_value) {
            (Some(_), Some(last)) => {
                let delta = reading.value - last;
                if delta >= 0.0 {
                    state.steps_today = state.steps_today.saturating_add(whole_steps(delta));
                    state.last_value = Some(reading.value);
                } else {
                    // Reboot or sensor reset. A negative delta cannot be
                    // attributed to today, so the accumulated count is
                    // dropped and the reading opens a new window.
                    state.steps_today = 0;
                    state.baseline = Some(reading.value);
                    state.last_value = Some(reading.value);
                }
            }
            (_, prior_last) => {
                // First reading of this window.
                if let Some(last) = prior_last {
                    // Same-day restart: credit steps taken while the process
                    // was down. A lower reading (reboot while down) credits 0.
                    state.steps_today = state
                        .steps_today
                        .saturating_add(whole_steps(reading.value - last));
                }
                state.baseline = Some(reading.value);
                state.last_value = Some(reading.value);
            }
        },
    }

    let emitted = state.steps_today;
    (state, emitted)
}

/// Read-only daily count. Stale state (a rolled-over day with no reading
/// yet) reads as 0; persisting that reset is the tracker's job.
pub fn query(state: &AccumulatorState, today: u16) -> u32 {
    if state.day == today {
        state.steps_today
    } else {
        0
    }
}

/// Explicit user-invoked reset, independent of rollover detection. The
/// cumulative resume point is kept so subsequent deltas count from here.
pub fn reset(prior: AccumulatorState, today: u16) -> AccumulatorState {
    AccumulatorState {
        steps_today: 0,
        day: today,
        ..prior
    }
}

/// Round a sensor delta to whole steps, clamping non-finite and negative
/// values to 0.
fn whole_steps(delta: f64) -> u32 {
    if !delta.is_finite() || delta <= 0.0 {
        return 0;
    }
    let rounded = delta.round();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}
