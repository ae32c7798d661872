//! Command implementations: sensor assembly, tracking run, and the
//! query-style control surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use stride_bridge::{EventBus, STEP_EVENT};
use stride_config::{Config, RunMode, SensorKind};
use stride_core::persist::{
    KEY_INITIAL_VALUE, KEY_LAST_VALUE, KEY_STEPS_TODAY, VALUE_UNSET,
};
use stride_core::runner::{self, RunParams, SamplingMode};
use stride_core::{DailyTracker, local_day_of_year};
use stride_platform::store::FileStore;
use stride_platform::surface::LogSurface;
use stride_traits::{StateStore, StepSensor};

/// Simulated counter stride per poll when no real backend is compiled in.
#[cfg(not(all(feature = "iio", target_os = "linux")))]
const SIM_STEPS_PER_READ: f64 = 2.0;

#[cfg(all(feature = "iio", target_os = "linux"))]
fn make_counter_sensor() -> Box<dyn StepSensor + Send> {
    match stride_platform::iio::IioStepSensor::discover() {
        Ok(sensor) => Box::new(sensor),
        Err(e) => {
            tracing::warn!(error = %e, "IIO step counter not usable; degrading");
            Box::new(stride_platform::MissingSensor(
                stride_traits::SourceKind::CumulativeCounter,
            ))
        }
    }
}

#[cfg(not(all(feature = "iio", target_os = "linux")))]
fn make_counter_sensor() -> Box<dyn StepSensor + Send> {
    Box::new(stride_platform::SimulatedCounter::new(SIM_STEPS_PER_READ))
}

/// Assemble the sensor backend for the configured kind.
fn make_sensor(cfg: &Config) -> Box<dyn StepSensor + Send> {
    match cfg.sensor.kind {
        SensorKind::Counter => make_counter_sensor(),
        SensorKind::Detector => Box::new(stride_platform::SimulatedDetector),
    }
}

fn open_store(cfg: &Config) -> eyre::Result<FileStore> {
    FileStore::open(&cfg.store.path)
        .wrap_err_with(|| format!("opening state store {}", cfg.store.path.display()))
}

/// Run the tracking loop until Ctrl-C (or the optional duration elapses).
/// Returns the final daily count.
pub fn run_track(cfg: &Config, direct: bool, duration_s: Option<u64>, json: bool) -> eyre::Result<u32> {
    let store = open_store(cfg)?;
    let bus = EventBus::new();

    // The presentation layer: a subscriber printing every bridge event.
    let rx = bus.subscribe();
    let printer = std::thread::spawn(move || {
        for event in rx.iter() {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "event": STEP_EVENT, "steps_today": event.steps_today })
                );
            } else {
                println!("{} steps today", event.steps_today);
            }
        }
    });

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })
    .wrap_err("installing Ctrl-C handler")?;

    if let Some(secs) = duration_s {
        let flag = shutdown.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_secs(secs));
            flag.store(true, Ordering::Relaxed);
        });
    }

    let use_direct = direct || cfg.runner.mode == RunMode::Direct;
    let params = RunParams {
        sampling: (&cfg.sampling).into(),
        timeouts: (&cfg.timeouts).into(),
        mode: if use_direct {
            SamplingMode::Direct
        } else {
            SamplingMode::Paced(cfg.sampling.rate_hz)
        },
    };
    let surface = LogSurface::new(&cfg.notification.title, &cfg.notification.text);
    let sensor = make_sensor(cfg);

    let final_steps = runner::run(sensor, store, bus.clone(), surface, params, shutdown)?;

    // Dropping the last bus clone disconnects the printer's receiver.
    drop(bus);
    let _ = printer.join();
    Ok(final_steps)
}

/// Today's count, with the lazy day rollover persisted.
pub fn query_steps(cfg: &Config) -> eyre::Result<u32> {
    let store = open_store(cfg)?;
    let mut tracker = DailyTracker::builder()
        .with_store(store)
        .with_sink(EventBus::new())
        .build()?;
    Ok(tracker.steps_today(local_day_of_year()))
}

/// Force today's count back to zero.
pub fn reset_steps(cfg: &Config) -> eyre::Result<()> {
    let store = open_store(cfg)?;
    let mut tracker = DailyTracker::builder()
        .with_store(store)
        .with_sink(EventBus::new())
        .build()?;
    tracker.reset(local_day_of_year());
    if tracker.persist_failures() > 0 {
        eyre::bail!("reset was not persisted");
    }
    Ok(())
}

/// Sensor description plus the persisted tracking values.
pub fn sensor_info(cfg: &Config, json: bool) -> eyre::Result<String> {
    let sensor = make_sensor(cfg);
    let store = open_store(cfg)?;
    let info = sensor.info();
    let initial = store.get_f64(KEY_INITIAL_VALUE).unwrap_or(VALUE_UNSET);
    let last = store.get_f64(KEY_LAST_VALUE).unwrap_or(VALUE_UNSET);
    let steps_today = store.get_i64(KEY_STEPS_TODAY).unwrap_or(0);

    if !sensor.available() {
        return Ok(if json {
            serde_json::json!({ "available": false }).to_string()
        } else {
            "step sensor not available".to_owned()
        });
    }

    Ok(if json {
        serde_json::json!({
            "available": true,
            "sensor": info.name,
            "vendor": info.vendor,
            "initial_value": initial,
            "last_value": last,
            "steps_today": steps_today,
        })
        .to_string()
    } else {
        format!(
            "Sensor: {}\nVendor: {}\nInitial Value: {}\nLast Value: {}\nSteps Today: {}",
            info.name, info.vendor, initial, last, steps_today
        )
    })
}

/// Sensor presence and store writability. Sensor absence degrades the
/// tracker, so it is reported but not a failure.
pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<String> {
    let sensor = make_sensor(cfg);
    let sensor_ok = sensor.available();

    let mut store = open_store(cfg)?;
    let probe = |e: Box<dyn std::error::Error + Send + Sync>| eyre::eyre!("store probe failed: {e}");
    store.put_i64("self_check_probe", 1).map_err(probe)?;
    store.flush().map_err(probe)?;
    store.remove("self_check_probe").map_err(probe)?;
    store.flush().map_err(probe)?;

    if !sensor_ok {
        tracing::warn!("self-check: no step sensor; tracking will report persisted counts only");
    }
    Ok(if json {
        serde_json::json!({ "store": "ok", "sensor": sensor_ok }).to_string()
    } else if sensor_ok {
        "self-check ok".to_owned()
    } else {
        "self-check ok (no step sensor; degraded)".to_owned()
    })
}

/// Operational health: whether tracking data exists and today's count.
pub fn health(cfg: &Config) -> eyre::Result<String> {
    let store = open_store(cfg)?;
    let has_data = store.contains(KEY_STEPS_TODAY);
    let mut tracker = DailyTracker::builder()
        .with_store(store)
        .with_sink(EventBus::new())
        .build()?;
    let steps_today = tracker.steps_today(local_day_of_year());
    Ok(serde_json::json!({
        "status": "ok",
        "has_data": has_data,
        "steps_today": steps_today,
    })
    .to_string())
}
