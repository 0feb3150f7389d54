//! The tracked path: an append-only walk that may close into a loop.

use crate::geo_utils::{haversine_distance, path_length};
use crate::{GeoPoint, Sample};

/// Ordered points of the loop being walked, plus closure state.
///
/// Points only grow until [`TrackedPath::clear`]. Once the path is closed no
/// further points are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedPath {
    points: Vec<GeoPoint>,
    closed: bool,
    last_accepted_timestamp: Option<f64>,
}

impl TrackedPath {
    /// Create an empty, open path.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn first(&self) -> Option<&GeoPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    /// Timestamp of the most recently appended point.
    pub fn last_accepted_timestamp(&self) -> Option<f64> {
        self.last_accepted_timestamp
    }

    /// Total walked length in meters (closing segment excluded).
    pub fn total_length(&self) -> f64 {
        path_length(&self.points)
    }

    /// Append `sample` if it moved far enough from the last point.
    ///
    /// The first point is always appended. Later points must be strictly more
    /// than `min_displacement_m` away from the previous point; closer points
    /// are GPS noise and are dropped. Returns whether a point was appended.
    pub fn accumulate(&mut self, sample: &Sample, min_displacement_m: f64) -> bool {
        if self.closed {
            return false;
        }

        if let Some(last) = self.points.last() {
            if haversine_distance(&sample.point, last) <= min_displacement_m {
                return false;
            }
        }

        self.points.push(sample.point);
        self.last_accepted_timestamp = Some(sample.timestamp);
        true
    }

    /// Close the loop if the walk has returned near its start.
    ///
    /// Requires at least `min_points` points. A distance exactly at
    /// `closure_threshold_m` closes the loop. Does nothing on a closed path.
    pub fn check_closure(&mut self, closure_threshold_m: f64, min_points: usize) -> bool {
        if self.closed || self.points.len() < min_points {
            return false;
        }

        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return false;
        };

        if haversine_distance(first, last) <= closure_threshold_m {
            self.closed = true;
            return true;
        }
        false
    }

    /// Distance from the latest point back to the start, if any.
    pub fn distance_to_start(&self) -> Option<f64> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some(haversine_distance(first, last)),
            _ => None,
        }
    }

    /// Copy of the current points.
    pub fn snapshot(&self) -> Vec<GeoPoint> {
        self.points.clone()
    }

    /// Reset to the empty, open state.
    pub fn clear(&mut self) {
        self.points.clear();
        self.closed = false;
        self.last_accepted_timestamp = None;
    }

    /// Reopen after a failed validation so the walk can continue.
    pub(crate) fn reopen(&mut self) {
        self.closed = false;
    }
}
