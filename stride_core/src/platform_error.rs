//! Maps `Box<dyn Error>` from trait boundaries to typed `TrackerError`.
//!
//! The traits in `stride_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `stride_platform::PlatformError`
//! downcasting.

use crate::error::TrackerError;

/// Map a trait-boundary error to a typed `TrackerError`.
///
/// Attempts to downcast known platform error types first, then falls back
/// to string-based heuristics.
pub fn map_platform_error(e: &(dyn std::error::Error + 'static)) -> TrackerError {
    // Feature-gated: try to downcast to PlatformError for precise mapping
    #[cfg(feature = "platform-errors")]
    {
        if let Some(pe) = e.downcast_ref::<stride_platform::error::PlatformError>() {
            return match pe {
                stride_platform::error::PlatformError::NoSensor => {
                    TrackerError::SensorUnavailable(pe.to_string())
                }
                stride_platform::error::PlatformError::PermissionDenied => {
                    TrackerError::PermissionDenied(pe.to_string())
                }
                stride_platform::error::PlatformError::Corrupt(_) => {
                    TrackerError::Persistence(pe.to_string())
                }
                other => TrackerError::Sensor(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("permission") {
        TrackerError::PermissionDenied(s)
    } else if lower.contains("no sensor") || lower.contains("unavailable") {
        TrackerError::SensorUnavailable(s)
    } else {
        TrackerError::Sensor(s)
    }
}

#[cfg(test)]
mod tests {
    use super::map_platform_error;
    use crate::error::TrackerError;

    #[test]
    fn string_fallback_classifies_permission() {
        let e: Box<dyn std::error::Error + Send + Sync> = "sensor permission denied".into();
        match map_platform_error(&*e) {
            TrackerError::PermissionDenied(_) => {}
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn string_fallback_defaults_to_sensor() {
        let e: Box<dyn std::error::Error + Send + Sync> = "i2c bus glitch".into();
        match map_platform_error(&*e) {
            TrackerError::Sensor(_) => {}
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
