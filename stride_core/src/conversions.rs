//! From impls mapping `stride_config` TOML types to runtime config structs.

use crate::config::{SamplingCfg, Timeouts};

impl From<&stride_config::Sampling> for SamplingCfg {
    fn from(cfg: &stride_config::Sampling) -> Self {
        Self {
            rate_hz: cfg.rate_hz,
        }
    }
}

impl From<&stride_config::Timeouts> for Timeouts {
    fn from(cfg: &stride_config::Timeouts) -> Self {
        Self {
            sensor_ms: cfg.sample_ms,
        }
    }
}
