#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and validation for the step tracking service.
//!
//! `Config` and sub-structs are deserialized from TOML and validated. Every
//! section is optional; omitted fields take the documented defaults so an
//! empty file is a valid config.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Which sensor backend to track with.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Cumulative steps-since-boot counter.
    #[default]
    Counter,
    /// One event per detected step.
    Detector,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SensorCfg {
    pub kind: SensorKind,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sampling {
    /// Polling rate in Hz for paced mode.
    pub rate_hz: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self { rate_hz: 5 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Sampling timeout per read (ms). Also accepts alias "sensor_ms".
    #[serde(alias = "sensor_ms")]
    pub sample_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sample_ms: 1_000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreCfg {
    /// Path of the state file (TOML key/value map, written atomically).
    pub path: PathBuf,
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stride_state.toml"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub title: String,
    /// Body template; `{steps}` is replaced with the current daily count.
    pub text: String,
}

impl Default for Notification {
    fn default() -> Self {
        Self {
            title: "Step tracking active".to_owned(),
            text: "{steps} steps today".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Sampler,
    Direct,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RunnerCfg {
    /// Default orchestration mode: "sampler" (rate-paced) or "direct"
    pub mode: RunMode,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorCfg,
    pub sampling: Sampling,
    pub timeouts: Timeouts,
    pub store: StoreCfg,
    pub notification: Notification,
    pub logging: Logging,
    pub runner: RunnerCfg,
}

impl Config {
    /// Validate ranges and enumerations. Returns the first violation.
    pub fn validate(&self) -> eyre::Result<()> {
        if !(1..=200).contains(&self.sampling.rate_hz) {
            eyre::bail!(
                "sampling.rate_hz must be in 1..=200, got {}",
                self.sampling.rate_hz
            );
        }
        if self.timeouts.sample_ms == 0 {
            eyre::bail!("timeouts.sample_ms must be at least 1");
        }
        if self.store.path.as_os_str().is_empty() {
            eyre::bail!("store.path must not be empty");
        }
        if let Some(rotation) = &self.logging.rotation {
            match rotation.as_str() {
                "never" | "daily" | "hourly" => {}
                other => eyre::bail!("logging.rotation must be never|daily|hourly, got {other:?}"),
            }
        }
        if let Some(level) = &self.logging.level {
            match level.as_str() {
                "error" | "warn" | "info" | "debug" | "trace" => {}
                other => eyre::bail!("logging.level unknown: {other:?}"),
            }
        }
        Ok(())
    }
}

/// Read, parse, and validate a config file.
pub fn load_config(path: &Path) -> eyre::Result<Config> {
    use eyre::WrapErr;

    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let cfg: Config = toml::from_str(&text)
        .wrap_err_with(|| format!("parsing config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
