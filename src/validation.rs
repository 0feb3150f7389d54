//! Territory validation for closed loops.
//!
//! Four checks run in order, cheapest first, stopping at the first failure:
//! 1. point count
//! 2. total walked length
//! 3. self-intersection
//! 4. enclosed area

use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::geo_utils::path_length;
use crate::geometry::{has_self_intersection, polygon_area};
use crate::territory::format_area;
use crate::{GeoPoint, TrackingConfig};

/// Why a loop was not accepted as a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum FailureReason {
    InsufficientPoints,
    PathTooShort,
    SelfIntersecting,
    AreaTooSmall,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InsufficientPoints => "insufficient_points",
            FailureReason::PathTooShort => "path_too_short",
            FailureReason::SelfIntersecting => "self_intersecting",
            FailureReason::AreaTooSmall => "area_too_small",
        }
    }
}

/// Verdict for one closure attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ValidationResult {
    pub valid: bool,
    pub failure_reason: Option<FailureReason>,
    /// Enclosed area in m². Zero unless validation reached the area check.
    pub area: f64,
    /// Number of points in the validated path
    pub point_count: u32,
    /// Walked length in meters. Zero when the point-count check failed.
    pub path_length_m: f64,
}

impl ValidationResult {
    fn failed(reason: FailureReason, point_count: usize, path_length_m: f64, area: f64) -> Self {
        Self {
            valid: false,
            failure_reason: Some(reason),
            area,
            point_count: point_count as u32,
            path_length_m,
        }
    }

    /// Human-readable summary for the presentation layer.
    pub fn describe(&self, config: &TrackingConfig) -> String {
        match self.failure_reason {
            None => format!("Territory claimed: {}", format_area(self.area)),
            Some(FailureReason::InsufficientPoints) => format!(
                "Not enough points: {} recorded, {} required",
                self.point_count, config.min_points
            ),
            Some(FailureReason::PathTooShort) => format!(
                "Path too short: {:.0} m walked, {:.0} m required",
                self.path_length_m, config.min_path_length_m
            ),
            Some(FailureReason::SelfIntersecting) => {
                "Path crosses itself; walk a simple loop".to_string()
            }
            Some(FailureReason::AreaTooSmall) => format!(
                "Area too small: {} enclosed, {} required",
                format_area(self.area),
                format_area(config.min_area_m2)
            ),
        }
    }
}

/// Validate an ordered loop of points.
///
/// # Example
/// ```
/// use geofence::{FailureReason, GeoPoint, TrackingConfig, validate};
///
/// let points = vec![GeoPoint::new(0.0, 0.0); 5];
/// let result = validate(&points, &TrackingConfig::default());
/// assert!(!result.valid);
/// assert_eq!(result.failure_reason, Some(FailureReason::InsufficientPoints));
/// ```
pub fn validate(points: &[GeoPoint], config: &TrackingConfig) -> ValidationResult {
    let point_count = points.len();

    if point_count < config.min_points as usize {
        debug!(
            "Validation failed: {} points < {} required",
            point_count, config.min_points
        );
        return ValidationResult::failed(FailureReason::InsufficientPoints, point_count, 0.0, 0.0);
    }

    let length = path_length(points);
    if length < config.min_path_length_m {
        debug!(
            "Validation failed: path length {:.1}m < {:.1}m",
            length, config.min_path_length_m
        );
        return ValidationResult::failed(FailureReason::PathTooShort, point_count, length, 0.0);
    }

    if has_self_intersection(points) {
        debug!("Validation failed: path crosses itself");
        return ValidationResult::failed(FailureReason::SelfIntersecting, point_count, length, 0.0);
    }

    let area = polygon_area(points);
    if area < config.min_area_m2 {
        debug!(
            "Validation failed: area {:.1}m² < {:.1}m²",
            area, config.min_area_m2
        );
        return ValidationResult::failed(FailureReason::AreaTooSmall, point_count, length, area);
    }

    info!(
        "Validation passed: {} points, {:.0}m walked, {:.0}m² enclosed",
        point_count, length, area
    );

    ValidationResult {
        valid: true,
        failure_reason: None,
        area,
        point_count: point_count as u32,
        path_length_m: length,
    }
}

/// Validate many recorded loops.
#[cfg(feature = "parallel")]
pub fn validate_batch(paths: &[Vec<GeoPoint>], config: &TrackingConfig) -> Vec<ValidationResult> {
    paths.par_iter().map(|p| validate(p, config)).collect()
}

/// Validate many recorded loops.
#[cfg(not(feature = "parallel"))]
pub fn validate_batch(paths: &[Vec<GeoPoint>], config: &TrackingConfig) -> Vec<ValidationResult> {
    paths.iter().map(|p| validate(p, config)).collect()
}
