//! State-change notifications for the presentation layer.
//!
//! The session reports what happened through [`TrackingObserver`]s. Delivery
//! is synchronous and fire-and-forget; observers decide how to marshal events
//! onto their own threads.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationResult;

/// How serious a speed violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum SpeedSeverity {
    /// Sample dropped, tracking continues
    Warn,
    /// Sample dropped, tracking pauses
    Pause,
}

/// A discrete change in tracking state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum TrackingEvent {
    TrackingStarted,
    TrackingStopped,
    TrackingResumed,
    PathCleared,
    PathPointAdded {
        count: u32,
    },
    SpeedWarning {
        speed_kmh: f64,
        severity: SpeedSeverity,
    },
    SpeedNormal,
    PathClosed,
    ValidationCompleted {
        result: ValidationResult,
    },
}

impl TrackingEvent {
    /// Stable short name, used in logs and the journal.
    pub fn name(&self) -> &'static str {
        match self {
            TrackingEvent::TrackingStarted => "tracking_started",
            TrackingEvent::TrackingStopped => "tracking_stopped",
            TrackingEvent::TrackingResumed => "tracking_resumed",
            TrackingEvent::PathCleared => "path_cleared",
            TrackingEvent::PathPointAdded { .. } => "path_point_added",
            TrackingEvent::SpeedWarning { .. } => "speed_warning",
            TrackingEvent::SpeedNormal => "speed_normal",
            TrackingEvent::PathClosed => "path_closed",
            TrackingEvent::ValidationCompleted { .. } => "validation_completed",
        }
    }
}

/// Receiver of tracking events.
///
/// Observers may be shared with other threads, so implementations must be
/// `Send + Sync`.
pub trait TrackingObserver: Send + Sync {
    fn on_event(&self, event: &TrackingEvent);
}

/// Forwards events over a channel.
///
/// Sending never blocks; events sent after the receiver is gone are dropped.
#[derive(Debug)]
pub struct ChannelObserver {
    tx: Sender<TrackingEvent>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<TrackingEvent>) -> Self {
        Self { tx }
    }
}

impl TrackingObserver for ChannelObserver {
    fn on_event(&self, event: &TrackingEvent) {
        let _ = self.tx.send(event.clone());
    }
}
