//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose the tracking engine
//! to Swift and Kotlin. Free functions are prefixed with `ffi_` to avoid
//! naming conflicts with the internal API.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::{
    ChannelObserver, GeoPoint, Sample, SampleOutcome, SpeedSeverity, TerritoryCandidate,
    TrackingConfig, TrackingEvent, TrackingSession, ValidationResult, format_area, init_logging,
    polygon_area, validate,
};

// ============================================================================
// Sample Reports
// ============================================================================

/// What happened to a pushed sample.
///
/// Some outcomes (`Discarded`, `Invalid`, `Ignored`) emit no event, so hosts
/// read them here.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiSampleOutcome {
    Ignored,
    Invalid,
    Rejected {
        speed_kmh: f64,
        severity: SpeedSeverity,
    },
    Discarded,
    Appended {
        count: u32,
    },
    Closed {
        result: ValidationResult,
    },
}

impl From<SampleOutcome> for FfiSampleOutcome {
    fn from(outcome: SampleOutcome) -> Self {
        match outcome {
            SampleOutcome::Ignored => FfiSampleOutcome::Ignored,
            SampleOutcome::Invalid => FfiSampleOutcome::Invalid,
            SampleOutcome::Rejected {
                speed_kmh,
                severity,
            } => FfiSampleOutcome::Rejected {
                speed_kmh,
                severity,
            },
            SampleOutcome::Discarded => FfiSampleOutcome::Discarded,
            SampleOutcome::Appended { count } => FfiSampleOutcome::Appended {
                count: count as u32,
            },
            SampleOutcome::Closed { result } => FfiSampleOutcome::Closed { result },
        }
    }
}

/// Result of one `push_sample` call.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSampleReport {
    pub outcome: FfiSampleOutcome,
    /// Events emitted while processing, in order
    pub events: Vec<TrackingEvent>,
}

// ============================================================================
// Session Object
// ============================================================================

/// A tracking session owned by the host app.
///
/// Each call runs synchronously and returns the events it produced, so the
/// host can apply them on its main thread.
#[derive(uniffi::Object)]
pub struct FfiTrackingSession {
    session: Mutex<TrackingSession>,
    events: Mutex<Receiver<TrackingEvent>>,
}

impl FfiTrackingSession {
    fn with_session<T>(&self, default: T, f: impl FnOnce(&mut TrackingSession) -> T) -> T {
        match self.session.lock() {
            Ok(mut session) => f(&mut session),
            Err(e) => {
                warn!("[GeofenceRust] Session lock poisoned: {}", e);
                default
            }
        }
    }

    fn take_events(&self) -> Vec<TrackingEvent> {
        self.events
            .lock()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default()
    }
}

#[uniffi::export]
impl FfiTrackingSession {
    /// Create a session. An invalid config falls back to the defaults.
    #[uniffi::constructor]
    pub fn new(config: TrackingConfig) -> Arc<Self> {
        init_logging();
        let mut session = TrackingSession::with_config(config).unwrap_or_else(|e| {
            warn!("[GeofenceRust] {}; using default config", e);
            TrackingSession::new()
        });

        let (tx, rx) = mpsc::channel();
        session.add_observer(Arc::new(ChannelObserver::new(tx)));
        info!("[GeofenceRust] Tracking session created");

        Arc::new(Self {
            session: Mutex::new(session),
            events: Mutex::new(rx),
        })
    }

    pub fn start(&self) -> Vec<TrackingEvent> {
        self.with_session((), |s| s.start());
        self.take_events()
    }

    pub fn stop(&self) -> Vec<TrackingEvent> {
        self.with_session((), |s| s.stop());
        self.take_events()
    }

    pub fn resume(&self) -> Vec<TrackingEvent> {
        self.with_session(false, |s| s.resume());
        self.take_events()
    }

    pub fn clear(&self) -> Vec<TrackingEvent> {
        self.with_session((), |s| s.clear());
        self.take_events()
    }

    /// Feed one location fix through the pipeline.
    pub fn push_sample(&self, sample: Sample) -> FfiSampleReport {
        let outcome = self.with_session(SampleOutcome::Ignored, |s| s.process_sample(sample));
        FfiSampleReport {
            outcome: outcome.into(),
            events: self.take_events(),
        }
    }

    pub fn path_points(&self) -> Vec<GeoPoint> {
        self.with_session(Vec::new(), |s| s.path().snapshot())
    }

    pub fn point_count(&self) -> u32 {
        self.with_session(0, |s| s.path().len() as u32)
    }

    pub fn is_tracking(&self) -> bool {
        self.with_session(false, |s| s.is_tracking())
    }

    pub fn last_result(&self) -> Option<ValidationResult> {
        self.with_session(None, |s| s.last_result().cloned())
    }

    /// The validated loop waiting to be saved by the host, if any.
    pub fn candidate(&self) -> Option<TerritoryCandidate> {
        self.with_session(None, |s| s.candidate())
    }
}

// ============================================================================
// Stateless Functions
// ============================================================================

/// Validate a finished loop.
#[uniffi::export]
pub fn ffi_validate(points: Vec<GeoPoint>, config: TrackingConfig) -> ValidationResult {
    init_logging();
    info!("[GeofenceRust] validate called with {} points", points.len());
    validate(&points, &config)
}

/// Enclosed area of a loop in m².
#[uniffi::export]
pub fn ffi_polygon_area(points: Vec<GeoPoint>) -> f64 {
    polygon_area(&points)
}

/// Display string for an area.
#[uniffi::export]
pub fn ffi_format_area(area_m2: f64) -> String {
    format_area(area_m2)
}

/// Get default configuration.
#[uniffi::export]
pub fn default_tracking_config() -> TrackingConfig {
    init_logging();
    TrackingConfig::default()
}
