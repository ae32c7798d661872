pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Which kind of step source a sensor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Monotonic total-steps-since-boot counter; resets to zero on reboot.
    CumulativeCounter,
    /// One event per detected step (or step burst); carries a count, no total.
    DiscreteDetector,
}

/// A single sensor delivery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReading {
    /// Cumulative total for `CumulativeCounter`, per-event count for
    /// `DiscreteDetector` (typically 1.0).
    pub value: f64,
    pub kind: SourceKind,
}

impl StepReading {
    pub fn counter(value: f64) -> Self {
        Self {
            value,
            kind: SourceKind::CumulativeCounter,
        }
    }

    pub fn detected(count: f64) -> Self {
        Self {
            value: count,
            kind: SourceKind::DiscreteDetector,
        }
    }
}

/// Static description of a step sensor, for diagnostics output.
#[derive(Debug, Clone, Default)]
pub struct SensorInfo {
    pub name: String,
    pub vendor: String,
}

pub trait StepSensor {
    /// Block until the next reading is available or the timeout expires.
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<StepReading, Box<dyn std::error::Error + Send + Sync>>;

    fn kind(&self) -> SourceKind;

    /// Whether a compatible sensor is present. Absence is not an error;
    /// callers degrade to reporting persisted values.
    fn available(&self) -> bool {
        true
    }

    fn info(&self) -> SensorInfo {
        SensorInfo::default()
    }
}

impl<T: StepSensor + ?Sized> StepSensor for Box<T> {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<StepReading, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }

    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn available(&self) -> bool {
        (**self).available()
    }

    fn info(&self) -> SensorInfo {
        (**self).info()
    }
}

/// String-keyed durable storage for accumulator state. Missing keys default
/// to a documented sentinel at the call site; implementations only report
/// presence/absence.
pub trait StateStore {
    fn get_i64(&self, key: &str) -> Option<i64>;
    fn get_f64(&self, key: &str) -> Option<f64>;
    fn put_i64(
        &mut self,
        key: &str,
        value: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn put_f64(
        &mut self,
        key: &str,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn remove(&mut self, key: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Make prior puts durable. Best-effort; no transactional guarantee.
    fn flush(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.get_i64(key).is_some() || self.get_f64(key).is_some()
    }
}

/// Fire-and-forget delivery of the current daily count to zero or more
/// listeners. Must never block the sensor callback path; a missed delivery
/// is not retried (the next reading re-emits).
pub trait StepSink {
    fn emit(&self, steps_today: u32);
}

/// Keeps the hosting process alive and visible to the operating system.
/// `establish` must be called before sensor registration on platforms that
/// kill background work aggressively.
pub trait ForegroundSurface {
    fn establish(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn update(&mut self, steps_today: u32);
    fn dismiss(&mut self);
}
