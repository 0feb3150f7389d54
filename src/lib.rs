//! # Geofence
//!
//! Loop tracking and territory validation engine for location-based games.
//!
//! This library provides:
//! - Speed-based admission of raw GPS samples (anti-cheat)
//! - Path accumulation with a minimum-displacement noise filter
//! - Loop closure detection
//! - Territory validation (point count, length, self-intersection, area)
//! - Flat-projection shoelace area for pedestrian-scale polygons
//! - An explicit tracking session with a sample channel and event observers
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch validation with rayon
//! - **`synthetic`** - Deterministic synthetic loop generators
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`cli`** - Build the `geofence-cli` debugging tool
//!
//! ## Quick Start
//!
//! ```rust
//! use geofence::{GeoPoint, Sample, SampleOutcome, TrackingSession};
//!
//! let mut session = TrackingSession::new();
//! session.start();
//!
//! let outcome = session.process_sample(Sample::new(GeoPoint::new(31.2304, 121.4737), 0.0));
//! assert_eq!(outcome, SampleOutcome::Appended { count: 1 });
//! ```

use rstar::{AABB, RTreeObject};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{GeofenceError, OptionExt, Result};

// Geographic utilities (distance, bounds, speed conversions)
pub mod geo_utils;

// Planar geometry over lon/lat: polygon area and segment intersection
pub mod geometry;
pub use geometry::{has_self_intersection, polygon_area, segments_intersect};

// Speed-plausibility filter for incoming samples
pub mod admission;
pub use admission::{Admission, admit};

// Tracked path: accumulation and closure detection
pub mod path;
pub use path::TrackedPath;

// Territory validation orchestrator
pub mod validation;
pub use validation::{FailureReason, ValidationResult, validate, validate_batch};

// State-change notifications for the presentation layer
pub mod events;
pub use events::{ChannelObserver, SpeedSeverity, TrackingEvent, TrackingObserver};

// Bounded, exportable event journal
pub mod journal;
pub use journal::{EventJournal, JournalEntry, JournalLevel};

// Finalized territories and formatting helpers
pub mod territory;
pub use territory::{TerritoryCandidate, TerritoryRecord, format_area};

// Persistence seam and in-memory registry
pub mod store;
pub use store::{TerritoryRegistry, TerritorySink};

// Tracking session (sample pipeline owner)
pub mod session;
pub use session::{SampleFeed, SampleOutcome, TrackingSession, TrackingState};

// Synthetic loop generator for benchmarks and the CLI
#[cfg(feature = "synthetic")]
pub mod synthetic;

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("GeofenceRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A WGS-84 coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use geofence::GeoPoint;
/// let point = GeoPoint::new(31.2304, 121.4737); // Shanghai
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A location fix as delivered by the location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Sample {
    pub point: GeoPoint,
    /// Capture time as Unix seconds (fractional)
    pub timestamp: f64,
}

impl Sample {
    pub fn new(point: GeoPoint, timestamp: f64) -> Self {
        Self { point, timestamp }
    }

    /// Shorthand for `Sample::new(GeoPoint::new(lat, lng), timestamp)`.
    pub fn at(latitude: f64, longitude: f64, timestamp: f64) -> Self {
        Self::new(GeoPoint::new(latitude, longitude), timestamp)
    }
}

/// Bounding box of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Check whether a point lies inside (inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}

impl RTreeObject for Bounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Thresholds for admission, accumulation, closure and validation.
///
/// Missing fields fall back to their defaults when deserialized, so a JSON
/// file only needs to name the thresholds it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackingConfig {
    /// Minimum distance from the previous point for a new point to be kept.
    /// Default: 10.0 meters (GPS jitter while standing still)
    pub min_displacement_m: f64,

    /// Maximum distance between the first and latest point to close the loop.
    /// Default: 30.0 meters
    pub closure_threshold_m: f64,

    /// Minimum number of path points for closure and validation.
    /// Default: 10
    pub min_points: u32,

    /// Minimum total walked length of a valid loop.
    /// Default: 50.0 meters
    pub min_path_length_m: f64,

    /// Minimum enclosed area of a valid loop.
    /// Default: 100.0 square meters
    pub min_area_m2: f64,

    /// Speeds above this are rejected with a warning.
    /// Default: 15.0 km/h
    pub warn_speed_kmh: f64,

    /// Speeds above this are rejected and pause tracking.
    /// Default: 30.0 km/h
    pub pause_speed_kmh: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_displacement_m: 10.0,
            closure_threshold_m: 30.0,
            min_points: 10,
            min_path_length_m: 50.0,
            min_area_m2: 100.0,
            warn_speed_kmh: 15.0,
            pause_speed_kmh: 30.0,
        }
    }
}

impl TrackingConfig {
    /// Parse a config from JSON; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_displacement_m", self.min_displacement_m),
            ("closure_threshold_m", self.closure_threshold_m),
            ("min_path_length_m", self.min_path_length_m),
            ("min_area_m2", self.min_area_m2),
            ("warn_speed_kmh", self.warn_speed_kmh),
            ("pause_speed_kmh", self.pause_speed_kmh),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GeofenceError::InvalidConfig {
                    field,
                    reason: format!("must be a positive finite number, got {}", value),
                });
            }
        }

        // The self-intersection scan needs at least four points to mean anything
        if self.min_points < 4 {
            return Err(GeofenceError::InvalidConfig {
                field: "min_points",
                reason: format!("must be at least 4, got {}", self.min_points),
            });
        }

        if self.warn_speed_kmh > self.pause_speed_kmh {
            return Err(GeofenceError::InvalidConfig {
                field: "warn_speed_kmh",
                reason: format!(
                    "warning speed {} km/h exceeds pause speed {} km/h",
                    self.warn_speed_kmh, self.pause_speed_kmh
                ),
            });
        }

        Ok(())
    }
}
