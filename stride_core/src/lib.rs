#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core daily step accumulation logic (platform-agnostic).
//!
//! This crate provides the platform-independent tracking engine. All platform
//! interactions go through the `stride_traits` seams: `StepSensor`,
//! `StateStore`, `StepSink`, `ForegroundSurface`.
//!
//! ## Architecture
//!
//! - **Accumulator**: pure transition function over
//!   `(prior state, reading, day)` (`accumulator` module)
//! - **Persistence**: write-through key/value schema with documented
//!   sentinels (`persist` module)
//! - **Tracker**: stateful engine driven by `{Start, Reading, Stop}` events
//!   (`tracker` module)
//! - **Sampler**: background thread owning the sensor (`sampler` module)
//! - **Runner**: foreground-surface ordering and the tracking loop
//!   (`runner` module)
//!
//! Daily counts are `u32` throughout; fractional sensor deltas are rounded
//! per reading and clamped so the count can never go negative.

pub mod accumulator;
pub mod config;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod persist;
pub mod runner;
pub mod sampler;
pub mod status;
pub mod tracker;
pub mod util;

mod platform_error;

pub use accumulator::{AccumulatorState, advance, query, reset};
pub use config::{SamplingCfg, Timeouts};
pub use error::{BuildError, Result, TrackerError};
pub use platform_error::map_platform_error;
pub use status::TrackerStatus;
pub use tracker::{DailyTracker, TrackerBuilder, TrackerEvent};
pub use util::local_day_of_year;
