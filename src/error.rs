//! Unified error type for the crate.
//!
//! Policy rejections (speed violations, failed validation) are not errors and
//! never show up here; they are typed outcomes. This type covers faults at the
//! edges: configuration, the sample feed, the persistence seam and JSON.

use thiserror::Error;

/// Errors produced at the edges of the tracking engine.
#[derive(Debug, Error)]
pub enum GeofenceError {
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("sample feed disconnected: the tracking session was dropped")]
    FeedDisconnected,

    #[error("territory sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("territory '{id}' not found")]
    TerritoryNotFound { id: String },

    #[error("territory '{id}' has {point_count} points, need at least {minimum_required}")]
    InsufficientPoints {
        id: String,
        point_count: usize,
        minimum_required: usize,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GeofenceError>;

/// Conversions from `Option` lookups into crate errors.
pub trait OptionExt<T> {
    /// Map `None` to [`GeofenceError::TerritoryNotFound`].
    fn ok_or_not_found(self, id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, id: &str) -> Result<T> {
        self.ok_or_else(|| GeofenceError::TerritoryNotFound { id: id.to_string() })
    }
}
