use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("no step sensor present")]
    NoSensor,
    #[error("sensor permission denied")]
    PermissionDenied,
    #[error("state file corrupt: {0}")]
    Corrupt(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
