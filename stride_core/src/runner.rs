//! Tracking loop orchestration.
//!
//! Ordering contract: the foreground surface is established before the
//! sensor is registered, because platforms that kill background work
//! aggressively require a visible process first. The loop then drives the
//! tracker until the shutdown flag is set, and always finishes with a
//! `Stop` event so the final flush happens with the last observed value.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use stride_traits::clock::{Clock, MonotonicClock};
use stride_traits::{ForegroundSurface, SourceKind, StateStore, StepSensor, StepSink};

use crate::config::{SamplingCfg, Timeouts};
use crate::error::Result as CoreResult;
use crate::platform_error::map_platform_error;
use crate::sampler::Sampler;
use crate::tracker::{DailyTracker, TrackerEvent};
use crate::util::local_day_of_year;

/// How sampling should be orchestrated
#[derive(Debug, Clone, Copy)]
pub enum SamplingMode {
    /// Read inside the tracking loop using StepSensor::read(timeout)
    Direct,
    /// Event-driven: block on the sensor's own delivery timing
    Event,
    /// Rate-paced sampling at given Hz
    Paced(u32),
}

/// Parameters for a tracking run.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub sampling: SamplingCfg,
    pub timeouts: Timeouts,
    pub mode: SamplingMode,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            sampling: SamplingCfg::default(),
            timeouts: Timeouts::default(),
            mode: SamplingMode::Paced(SamplingCfg::default().rate_hz),
        }
    }
}

/// Run the tracker until the shutdown flag is set, returning the final
/// daily count. Sensor absence and read failures degrade to reporting
/// persisted state; they never abort the run.
pub fn run<S, K, E, F>(
    mut sensor: S,
    store: K,
    sink: E,
    mut surface: F,
    params: RunParams,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<u32>
where
    S: StepSensor + Send + 'static,
    K: StateStore,
    E: StepSink,
    F: ForegroundSurface,
{
    // Surface first, sensor second.
    surface
        .establish()
        .map_err(|e| eyre::Report::new(map_platform_error(&*e)))
        .wrap_err("establishing foreground surface")?;

    let mut tracker = DailyTracker::builder().with_store(store).with_sink(sink).build()?;
    let status = tracker.handle(TrackerEvent::Start, local_day_of_year());
    surface.update(status.steps_today());
    tracing::info!(steps_today = status.steps_today(), "tracking started");

    let clock = MonotonicClock::new();
    let period = Duration::from_micros(crate::util::period_us(params.sampling.rate_hz));

    if sensor.available() {
        match params.mode {
            SamplingMode::Direct => {
                run_direct(&mut sensor, &mut tracker, &mut surface, &params, period, &shutdown);
            }
            SamplingMode::Event | SamplingMode::Paced(_) => {
                run_with_sampler(sensor, &mut tracker, &mut surface, &params, period, &shutdown);
            }
        }
    } else {
        // Degrade: no callbacks will ever arrive; keep the persisted count
        // visible until asked to stop.
        tracing::warn!("no compatible step sensor; reporting persisted counts only");
        while !shutdown.load(Ordering::Relaxed) {
            clock.sleep(period);
        }
    }

    let status = tracker.handle(TrackerEvent::Stop, local_day_of_year());
    surface.dismiss();
    tracing::info!(steps_today = status.steps_today(), "tracking stopped");
    Ok(status.steps_today())
}

fn run_direct<S, K, E, F>(
    sensor: &mut S,
    tracker: &mut DailyTracker<K, E>,
    surface: &mut F,
    params: &RunParams,
    period: Duration,
    shutdown: &AtomicBool,
) where
    S: StepSensor,
    K: StateStore,
    E: StepSink,
    F: ForegroundSurface,
{
    let clock = MonotonicClock::new();
    let timeout = Duration::from_millis(params.timeouts.sensor_ms);
    let mut shown: Option<u32> = None;

    while !shutdown.load(Ordering::Relaxed) {
        match sensor.read(timeout) {
            Ok(reading) => {
                let steps = tracker.apply(reading, local_day_of_year());
                show(surface, steps, &mut shown);
            }
            Err(e) => {
                let mapped = map_platform_error(&*e);
                tracing::warn!(error = %mapped, "sensor read failed");
            }
        }
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        clock.sleep(period);
    }
}

fn run_with_sampler<S, K, E, F>(
    sensor: S,
    tracker: &mut DailyTracker<K, E>,
    surface: &mut F,
    params: &RunParams,
    period: Duration,
    shutdown: &AtomicBool,
) where
    S: StepSensor + Send + 'static,
    K: StateStore,
    E: StepSink,
    F: ForegroundSurface,
{
    let clock = MonotonicClock::new();
    let kind = sensor.kind();
    let timeout = Duration::from_millis(params.timeouts.sensor_ms);
    let sampler = match params.mode {
        SamplingMode::Event => Sampler::spawn_event(sensor, timeout, MonotonicClock::new()),
        SamplingMode::Paced(hz) => Sampler::spawn(sensor, hz, timeout, MonotonicClock::new()),
        SamplingMode::Direct => unreachable!("direct mode has no sampler"),
    };

    // A stalled sensor is not an error here, unlike a control loop: we only
    // surface it in the log, debounced.
    let stall_warn_ms = params
        .timeouts
        .sensor_ms
        .saturating_mul(4)
        .max(crate::util::period_ms(params.sampling.rate_hz).saturating_mul(2));
    let mut stall_logged = false;
    let mut shown: Option<u32> = None;

    while !shutdown.load(Ordering::Relaxed) {
        match kind {
            SourceKind::CumulativeCounter => {
                // Coalesce: every reading is an absolute total.
                if let Some(reading) = sampler.latest() {
                    let steps = tracker.apply(reading, local_day_of_year());
                    show(surface, steps, &mut shown);
                }
            }
            SourceKind::DiscreteDetector => {
                // Every event carries a count; none may be skipped.
                let mut latest = None;
                for reading in sampler.drain() {
                    latest = Some(tracker.apply(reading, local_day_of_year()));
                }
                if let Some(steps) = latest {
                    show(surface, steps, &mut shown);
                }
            }
        }

        let stalled = sampler.stalled_for_now();
        if stalled > stall_warn_ms {
            if !stall_logged {
                tracing::debug!(stalled_ms = stalled, "no sensor delivery recently");
                stall_logged = true;
            }
        } else {
            stall_logged = false;
        }

        clock.sleep(period);
    }

    // Drain in-flight readings so the final flush uses the last observed
    // sensor value.
    for reading in sampler.stop() {
        let steps = tracker.apply(reading, local_day_of_year());
        show(surface, steps, &mut shown);
    }
}

fn show<F: ForegroundSurface>(surface: &mut F, steps: u32, shown: &mut Option<u32>) {
    if *shown != Some(steps) {
        surface.update(steps);
        *shown = Some(steps);
    }
}
