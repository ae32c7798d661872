use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use stride_core::config::{SamplingCfg, Timeouts};
use stride_core::mocks::{MemStore, NullSink};
use stride_core::runner::{RunParams, SamplingMode, run};
use stride_traits::{ForegroundSurface, SourceKind, StepReading, StepSensor};

/// Counter sensor that raises the shutdown flag after its scripted readings
/// are exhausted, making the direct loop deterministic.
struct ScriptedCounter {
    readings: Vec<f64>,
    idx: usize,
    shutdown: Arc<AtomicBool>,
}

impl StepSensor for ScriptedCounter {
    fn read(&mut self, _timeout: Duration) -> Result<StepReading, Box<dyn Error + Send + Sync>> {
        if self.idx >= self.readings.len() {
            self.shutdown.store(true, Ordering::Relaxed);
            return Err("script exhausted".into());
        }
        let v = self.readings[self.idx];
        self.idx += 1;
        if self.idx == self.readings.len() {
            self.shutdown.store(true, Ordering::Relaxed);
        }
        Ok(StepReading::counter(v))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::CumulativeCounter
    }
}

/// Surface that records lifecycle ordering.
#[derive(Clone, Default)]
struct SpySurface {
    established: Arc<AtomicBool>,
    updates: Arc<AtomicU32>,
    dismissed: Arc<AtomicBool>,
}

impl ForegroundSurface for SpySurface {
    fn establish(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.established.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn update(&mut self, _steps_today: u32) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    fn dismiss(&mut self) {
        self.dismissed.store(true, Ordering::Relaxed);
    }
}

fn fast_params(mode: SamplingMode) -> RunParams {
    RunParams {
        sampling: SamplingCfg { rate_hz: 200 },
        timeouts: Timeouts { sensor_ms: 20 },
        mode,
    }
}

#[test]
fn direct_run_accumulates_and_stops_on_flag() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let sensor = ScriptedCounter {
        readings: vec![5000.0, 5050.0, 5120.0],
        idx: 0,
        shutdown: shutdown.clone(),
    };
    let surface = SpySurface::default();
    let spy = surface.clone();

    let final_steps = run(
        sensor,
        MemStore::default(),
        NullSink,
        surface,
        fast_params(SamplingMode::Direct),
        shutdown,
    )
    .unwrap();

    assert_eq!(final_steps, 120);
    assert!(spy.established.load(Ordering::Relaxed));
    assert!(spy.dismissed.load(Ordering::Relaxed));
    // Start plus at least one reading made it to the notification.
    assert!(spy.updates.load(Ordering::Relaxed) >= 1);
}

#[test]
fn unavailable_sensor_degrades_to_idle_until_shutdown() {
    struct NoSensor;
    impl StepSensor for NoSensor {
        fn read(
            &mut self,
            _timeout: Duration,
        ) -> Result<StepReading, Box<dyn Error + Send + Sync>> {
            Err("no sensor".into())
        }
        fn kind(&self) -> SourceKind {
            SourceKind::CumulativeCounter
        }
        fn available(&self) -> bool {
            false
        }
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        flag.store(true, Ordering::Relaxed);
    });

    let final_steps = run(
        NoSensor,
        MemStore::default(),
        NullSink,
        SpySurface::default(),
        fast_params(SamplingMode::Paced(200)),
        shutdown,
    )
    .unwrap();
    assert_eq!(final_steps, 0);
}

#[test]
fn paced_run_with_sampler_accumulates() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let sensor = ScriptedCounter {
        readings: vec![100.0, 130.0, 160.0, 200.0],
        idx: 0,
        shutdown: shutdown.clone(),
    };

    // Sensor paced well below the loop rate so the first reading is polled
    // before the second arrives; coalescing later readings cannot change the
    // total for a cumulative source.
    let final_steps = run(
        sensor,
        MemStore::default(),
        NullSink,
        SpySurface::default(),
        fast_params(SamplingMode::Paced(4)),
        shutdown,
    )
    .unwrap();

    assert_eq!(final_steps, 100);
}

#[test]
fn surface_establish_failure_is_an_error() {
    struct BrokenSurface;
    impl ForegroundSurface for BrokenSurface {
        fn establish(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
            Err("denied".into())
        }
        fn update(&mut self, _steps_today: u32) {}
        fn dismiss(&mut self) {}
    }

    let shutdown = Arc::new(AtomicBool::new(true));
    let sensor = ScriptedCounter {
        readings: vec![],
        idx: 0,
        shutdown: shutdown.clone(),
    };
    let err = run(
        sensor,
        MemStore::default(),
        NullSink,
        BrokenSurface,
        fast_params(SamplingMode::Direct),
        shutdown,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("foreground surface"));
}
