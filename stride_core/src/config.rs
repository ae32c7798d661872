//! Runtime configuration for the tracking engine.
//!
//! These are the runtime structs used by the runner and sampler. They are
//! separate from the TOML-deserialized config in `stride_config`; see
//! `conversions` for the mapping.

/// Sampling configuration.
#[derive(Debug, Clone)]
pub struct SamplingCfg {
    /// Sampling rate in Hz for paced mode (drives loop period).
    pub rate_hz: u32,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self { rate_hz: 5 }
    }
}

/// Timeouts and watchdogs.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Max sensor wait per read (ms).
    pub sensor_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sensor_ms: 1_000 }
    }
}
