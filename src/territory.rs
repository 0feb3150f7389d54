//! Finalized territories.

use serde::{Deserialize, Serialize};

use crate::{Bounds, GeoPoint};

/// A validated loop ready to be handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TerritoryCandidate {
    /// Loop points in walking order
    pub path: Vec<GeoPoint>,
    /// Enclosed area in m²
    pub area: f64,
}

impl TerritoryCandidate {
    pub fn new(path: Vec<GeoPoint>, area: f64) -> Self {
        Self { path, area }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.path)
    }
}

/// A stored territory with identity assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TerritoryRecord {
    /// Unique identifier (e.g., "territory-3")
    pub id: String,
    /// Display name, user-editable
    pub name: String,
    pub path: Vec<GeoPoint>,
    /// Enclosed area in m²
    pub area: f64,
    pub bounds: Bounds,
    /// Unix timestamp (seconds) when the record was stored
    pub created_at: i64,
}

/// Format an area for display.
///
/// Hectares from 10 000 m², thousands of m² from 1 000 m², whole m² below.
///
/// ```
/// use geofence::format_area;
/// assert_eq!(format_area(850.4), "850 m²");
/// assert_eq!(format_area(2_500.0), "2.5k m²");
/// assert_eq!(format_area(12_500.0), "1.25 ha");
/// ```
pub fn format_area(area_m2: f64) -> String {
    if area_m2 >= 10_000.0 {
        format!("{:.2} ha", area_m2 / 10_000.0)
    } else if area_m2 >= 1_000.0 {
        format!("{:.1}k m²", area_m2 / 1_000.0)
    } else {
        format!("{:.0} m²", area_m2)
    }
}
