//! Platform collaborators for the step tracker.
//!
//! Simulated sensors for development and tests, a TOML-backed file store
//! with atomic writes, and a logging foreground surface. A real Linux IIO
//! step-counter backend is available behind the `iio` feature.

pub mod error;
pub mod store;
pub mod surface;

#[cfg(all(feature = "iio", target_os = "linux"))]
pub mod iio;

use std::time::Duration;

use stride_traits::{SensorInfo, SourceKind, StepReading, StepSensor};

/// Simulated cumulative step counter: the total grows by a fixed stride per
/// read. An optional reboot point drops the total back to zero, which is
/// how the discontinuity path is exercised end to end.
pub struct SimulatedCounter {
    total: f64,
    per_read: f64,
    reboot_after: Option<u32>,
    reads: u32,
}

impl SimulatedCounter {
    pub fn new(per_read: f64) -> Self {
        Self {
            total: 0.0,
            per_read,
            reboot_after: None,
            reads: 0,
        }
    }

    /// Reset the counter to zero after `reads` deliveries, as a reboot would.
    pub fn with_reboot_after(mut self, reads: u32) -> Self {
        self.reboot_after = Some(reads);
        self
    }
}

impl StepSensor for SimulatedCounter {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<StepReading, Box<dyn std::error::Error + Send + Sync>> {
        self.reads += 1;
        if self.reboot_after == Some(self.reads) {
            self.total = 0.0;
        }
        self.total += self.per_read;
        tracing::trace!(total = self.total, "simulated counter sample");
        Ok(StepReading::counter(self.total))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::CumulativeCounter
    }

    fn info(&self) -> SensorInfo {
        SensorInfo {
            name: "simulated-step-counter".to_owned(),
            vendor: "stride".to_owned(),
        }
    }
}

/// Simulated discrete detector: one single-step event per read.
pub struct SimulatedDetector;

impl StepSensor for SimulatedDetector {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<StepReading, Box<dyn std::error::Error + Send + Sync>> {
        Ok(StepReading::detected(1.0))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::DiscreteDetector
    }

    fn info(&self) -> SensorInfo {
        SensorInfo {
            name: "simulated-step-detector".to_owned(),
            vendor: "stride".to_owned(),
        }
    }
}

/// A sensor slot with nothing behind it. `available` is false and reads
/// fail with `NoSensor`; callers degrade to persisted counts.
pub struct MissingSensor(pub SourceKind);

impl StepSensor for MissingSensor {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<StepReading, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(error::PlatformError::NoSensor))
    }

    fn kind(&self) -> SourceKind {
        self.0
    }

    fn available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_counter_is_monotonic_until_reboot() {
        let mut sensor = SimulatedCounter::new(3.0).with_reboot_after(3);
        let t = Duration::from_millis(10);
        let a = sensor.read(t).unwrap().value;
        let b = sensor.read(t).unwrap().value;
        assert!(b > a);
        // Third read reboots: the total restarts below the last value.
        let c = sensor.read(t).unwrap().value;
        assert!(c < b);
    }

    #[test]
    fn detector_reports_single_steps() {
        let mut sensor = SimulatedDetector;
        let reading = sensor.read(Duration::from_millis(10)).unwrap();
        assert_eq!(reading.kind, SourceKind::DiscreteDetector);
        assert_eq!(reading.value, 1.0);
    }

    #[test]
    fn missing_sensor_reports_unavailable() {
        let mut sensor = MissingSensor(SourceKind::CumulativeCounter);
        assert!(!sensor.available());
        assert!(sensor.read(Duration::from_millis(10)).is_err());
    }
}
