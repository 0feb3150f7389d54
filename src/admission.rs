//! Speed-plausibility admission of raw location samples.
//!
//! A sample is compared against the most recently appended path point. The
//! implied speed decides whether the sample may enter the path, whether the
//! walker should be warned, or whether tracking has to pause.

use crate::events::SpeedSeverity;
use crate::geo_utils::{haversine_distance, speed_kmh};
use crate::path::TrackedPath;
use crate::{Sample, TrackingConfig};

/// Outcome of the admission check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// The sample may be accumulated. `speed_kmh` is `None` when no speed
    /// could be computed (first point, or no positive elapsed time).
    Admitted { speed_kmh: Option<f64> },
    /// The sample moved implausibly fast and is dropped.
    Rejected {
        speed_kmh: f64,
        severity: SpeedSeverity,
    },
    /// The sample's coordinates are out of range or not finite.
    InvalidCoordinate,
    /// The sample's timestamp is not finite, so no speed can be trusted.
    InvalidTimestamp,
}

impl Admission {
    /// Whether the sample may proceed to accumulation.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }

    /// Whether this outcome instructs the session to pause tracking.
    pub fn requires_pause(&self) -> bool {
        matches!(
            self,
            Admission::Rejected {
                severity: SpeedSeverity::Pause,
                ..
            }
        )
    }
}

/// Decide whether `candidate` may be appended to `path`.
///
/// Thresholds are checked from the strictest down: above
/// `pause_speed_kmh` rejects and pauses, above `warn_speed_kmh` rejects with a
/// warning, anything else is admitted.
pub fn admit(candidate: &Sample, path: &TrackedPath, config: &TrackingConfig) -> Admission {
    if !candidate.point.is_valid() {
        return Admission::InvalidCoordinate;
    }
    if !candidate.timestamp.is_finite() {
        return Admission::InvalidTimestamp;
    }

    let (Some(last), Some(last_timestamp)) = (path.last(), path.last_accepted_timestamp()) else {
        return Admission::Admitted { speed_kmh: None };
    };

    let distance = haversine_distance(&candidate.point, last);
    let elapsed = candidate.timestamp - last_timestamp;

    // Zero or negative elapsed time cannot yield a speed
    let Some(speed) = speed_kmh(distance, elapsed) else {
        return Admission::Admitted { speed_kmh: None };
    };

    if speed > config.pause_speed_kmh {
        Admission::Rejected {
            speed_kmh: speed,
            severity: SpeedSeverity::Pause,
        }
    } else if speed > config.warn_speed_kmh {
        Admission::Rejected {
            speed_kmh: speed,
            severity: SpeedSeverity::Warn,
        }
    } else {
        Admission::Admitted {
            speed_kmh: Some(speed),
        }
    }
}
