//! Structured error rendering for the CLI.
//!
//! In JSON mode errors are printed as a single machine-parseable line with a
//! stable `kind`; otherwise the full eyre report is used.

use stride_core::TrackerError;
use stride_platform::error::PlatformError;

/// Stable error kind name for structured output.
pub fn error_kind(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<TrackerError>() {
        Some(TrackerError::SensorUnavailable(_)) => "SensorUnavailable",
        Some(TrackerError::PermissionDenied(_)) => "PermissionDenied",
        Some(TrackerError::Sensor(_)) => "Sensor",
        Some(TrackerError::Persistence(_)) => "Persistence",
        Some(TrackerError::State(_)) => "State",
        None => match err.downcast_ref::<PlatformError>() {
            Some(PlatformError::NoSensor) => "SensorUnavailable",
            Some(PlatformError::PermissionDenied) => "PermissionDenied",
            Some(PlatformError::Corrupt(_) | PlatformError::Io(_)) => "Persistence",
            None => "Internal",
        },
    }
}

/// Render `err` for the terminal.
pub fn render(err: &eyre::Report, json: bool) -> String {
    if json {
        serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "message": format!("{err:#}"),
            }
        })
        .to_string()
    } else {
        format!("{err:?}")
    }
}
