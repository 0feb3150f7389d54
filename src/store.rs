//! Persistence seam and an in-memory territory registry.
//!
//! The engine only ever hands a [`TerritoryCandidate`] to a [`TerritorySink`].
//! Identity, naming, timestamps and storage belong to the sink.
//! [`TerritoryRegistry`] is the in-process implementation, with an R-tree for
//! map viewport queries.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use log::{info, warn};
use rstar::{AABB, RTree, RTreeObject};
use time::OffsetDateTime;

use crate::error::OptionExt;
use crate::geo_utils::{METERS_PER_DEGREE, meters_to_degrees};
use crate::territory::{TerritoryCandidate, TerritoryRecord};
use crate::{Bounds, GeoPoint, GeofenceError, Result};

/// Receiver of validated territories.
pub trait TerritorySink: Send {
    /// Take ownership of a validated candidate.
    fn save(&mut self, candidate: TerritoryCandidate) -> Result<()>;
}

/// Hand-off queue: candidates are forwarded to whoever holds the receiver.
impl TerritorySink for Sender<TerritoryCandidate> {
    fn save(&mut self, candidate: TerritoryCandidate) -> Result<()> {
        self.send(candidate)
            .map_err(|_| GeofenceError::SinkUnavailable("receiver dropped".to_string()))
    }
}

/// Shared sink, so the caller can keep querying a store the session writes to.
impl<S: TerritorySink> TerritorySink for Arc<Mutex<S>> {
    fn save(&mut self, candidate: TerritoryCandidate) -> Result<()> {
        let mut sink = self
            .lock()
            .map_err(|e| GeofenceError::SinkUnavailable(e.to_string()))?;
        sink.save(candidate)
    }
}

/// Territory bounds wrapper for R-tree spatial indexing.
#[derive(Debug, Clone)]
struct TerritoryBounds {
    id: String,
    bounds: Bounds,
}

impl RTreeObject for TerritoryBounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds.envelope()
    }
}

/// In-memory store of claimed territories.
#[derive(Debug)]
pub struct TerritoryRegistry {
    /// Insertion order, oldest first
    records: Vec<TerritoryRecord>,
    next_id: u64,
    tree: RTree<TerritoryBounds>,
    dirty: bool,
}

impl Default for TerritoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TerritoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            tree: RTree::new(),
            dirty: false,
        }
    }

    /// Store a candidate under a fresh id and default name.
    pub fn insert(&mut self, candidate: TerritoryCandidate) -> Result<&TerritoryRecord> {
        let id = format!("territory-{}", self.next_id);

        check_path(&id, &candidate.path)?;

        let bounds = candidate
            .bounds()
            .ok_or_else(|| GeofenceError::InsufficientPoints {
                id: id.clone(),
                point_count: 0,
                minimum_required: MIN_TERRITORY_POINTS,
            })?;

        let record = TerritoryRecord {
            id,
            name: self.default_name(),
            path: candidate.path,
            area: candidate.area,
            bounds,
            created_at: OffsetDateTime::now_utc().unix_timestamp(),
        };

        info!(
            "Stored territory {} ({:.0}m², {} points)",
            record.id,
            record.area,
            record.path.len()
        );

        self.next_id += 1;
        self.dirty = true;
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Name for the next stored territory.
    pub fn default_name(&self) -> String {
        format!("Territory #{}", self.records.len() + 1)
    }

    pub fn get(&self, id: &str) -> Option<&TerritoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<&TerritoryRecord> {
        self.records.iter().rev().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all stored areas in m².
    pub fn total_area(&self) -> f64 {
        self.records.iter().map(|r| r.area).sum()
    }

    /// Change a territory's display name.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_not_found(id)?;
        info!("Renamed territory {}: '{}' -> '{}'", id, record.name, name);
        record.name = name.to_string();
        Ok(())
    }

    /// Delete a territory and return it.
    pub fn remove(&mut self, id: &str) -> Result<TerritoryRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_not_found(id)?;
        self.dirty = true;
        Ok(self.records.remove(index))
    }

    /// Clear all territories.
    pub fn clear(&mut self) {
        self.records.clear();
        self.tree = RTree::new();
        self.dirty = false;
    }

    // ========================================================================
    // Spatial Queries
    // ========================================================================

    fn ensure_built(&mut self) {
        if !self.dirty {
            return;
        }
        let bounds: Vec<TerritoryBounds> = self
            .records
            .iter()
            .map(|r| TerritoryBounds {
                id: r.id.clone(),
                bounds: r.bounds,
            })
            .collect();
        self.tree = RTree::bulk_load(bounds);
        self.dirty = false;
    }

    /// Ids of territories whose bounds intersect the viewport.
    pub fn query_viewport(&mut self, viewport: &Bounds) -> Vec<String> {
        self.ensure_built();
        let search = viewport.envelope();
        self.tree
            .locate_in_envelope_intersecting(&search)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Ids of territories whose bounds come within `radius_m` of a point.
    pub fn find_nearby(&mut self, point: &GeoPoint, radius_m: f64) -> Vec<String> {
        let lat_radius = radius_m / METERS_PER_DEGREE;
        let lng_radius = meters_to_degrees(radius_m, point.latitude);
        self.query_viewport(&Bounds {
            min_lat: point.latitude - lat_radius,
            max_lat: point.latitude + lat_radius,
            min_lng: point.longitude - lng_radius,
            max_lng: point.longitude + lng_radius,
        })
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Serialize all records (oldest first) as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.records)?)
    }

    /// Rebuild a registry from a JSON snapshot produced by [`Self::to_json`].
    ///
    /// Records are checked like fresh inserts, and their bounds are
    /// recomputed from their paths rather than trusted.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut records: Vec<TerritoryRecord> = serde_json::from_str(json)?;

        for record in &mut records {
            check_path(&record.id, &record.path).inspect_err(|e| {
                warn!("Snapshot contains unusable territory {}: {}", record.id, e);
            })?;
            record.bounds = Bounds::from_points(&record.path).ok_or_else(|| {
                GeofenceError::InsufficientPoints {
                    id: record.id.clone(),
                    point_count: 0,
                    minimum_required: MIN_TERRITORY_POINTS,
                }
            })?;
        }

        let next_id = records
            .iter()
            .filter_map(|r| r.id.strip_prefix("territory-")?.parse::<u64>().ok())
            .max()
            .map_or(records.len() as u64 + 1, |max| max + 1);

        Ok(Self {
            dirty: !records.is_empty(),
            records,
            next_id,
            tree: RTree::new(),
        })
    }
}

/// Smallest path that encloses an area.
const MIN_TERRITORY_POINTS: usize = 3;

fn check_path(id: &str, path: &[GeoPoint]) -> Result<()> {
    if path.len() < MIN_TERRITORY_POINTS {
        return Err(GeofenceError::InsufficientPoints {
            id: id.to_string(),
            point_count: path.len(),
            minimum_required: MIN_TERRITORY_POINTS,
        });
    }
    if let Some(bad) = path.iter().find(|p| !p.is_valid()) {
        return Err(GeofenceError::InvalidCoordinate {
            latitude: bad.latitude,
            longitude: bad.longitude,
        });
    }
    Ok(())
}

impl TerritorySink for TerritoryRegistry {
    fn save(&mut self, candidate: TerritoryCandidate) -> Result<()> {
        self.insert(candidate).map(|_| ())
    }
}
