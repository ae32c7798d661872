use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TrackerError {
    #[error("no compatible step sensor: {0}")]
    SensorUnavailable(String),
    #[error("sensor access denied: {0}")]
    PermissionDenied(String),
    #[error("sensor read failed: {0}")]
    Sensor(String),
    #[error("state store failure: {0}")]
    Persistence(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing state store")]
    MissingStore,
    #[error("missing step sink")]
    MissingSink,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
