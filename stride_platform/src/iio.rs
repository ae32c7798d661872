//! Linux IIO step-counter backend (feature = "iio").
//!
//! Discovers the first IIO device exposing an `in_steps_input` attribute and
//! reads the cumulative step total from sysfs. Pacing is the sampler's job;
//! each read is a plain attribute read.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use stride_traits::{SensorInfo, SourceKind, StepReading, StepSensor};

use crate::error::{PlatformError, Result};

const IIO_ROOT: &str = "/sys/bus/iio/devices";
const STEPS_ATTR: &str = "in_steps_input";

pub struct IioStepSensor {
    attr: PathBuf,
    info: SensorInfo,
}

impl IioStepSensor {
    /// Scan the IIO bus for a step-counter channel.
    pub fn discover() -> Result<Self> {
        Self::discover_in(IIO_ROOT)
    }

    fn discover_in(root: &str) -> Result<Self> {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PlatformError::NoSensor);
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(PlatformError::PermissionDenied);
            }
            Err(e) => return Err(e.into()),
        };

        for entry in entries.flatten() {
            let attr = entry.path().join(STEPS_ATTR);
            if attr.exists() {
                let name = fs::read_to_string(entry.path().join("name"))
                    .map(|s| s.trim().to_owned())
                    .unwrap_or_else(|_| "iio-step-counter".to_owned());
                tracing::info!(device = %entry.path().display(), sensor = %name, "IIO step counter found");
                return Ok(Self {
                    attr,
                    info: SensorInfo {
                        name,
                        vendor: "iio".to_owned(),
                    },
                });
            }
        }
        Err(PlatformError::NoSensor)
    }
}

impl StepSensor for IioStepSensor {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> std::result::Result<StepReading, Box<dyn std::error::Error + Send + Sync>> {
        let text = fs::read_to_string(&self.attr).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => PlatformError::PermissionDenied,
            std::io::ErrorKind::NotFound => PlatformError::NoSensor,
            _ => PlatformError::Io(e),
        })?;
        let total: f64 = text
            .trim()
            .parse()
            .map_err(|_| PlatformError::Corrupt(format!("bad steps attribute: {text:?}")))?;
        Ok(StepReading::counter(total))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::CumulativeCounter
    }

    fn available(&self) -> bool {
        self.attr.exists()
    }

    fn info(&self) -> SensorInfo {
        self.info.clone()
    }
}
