//! Planar geometry over longitude (x) and latitude (y).
//!
//! Walked loops span at most a few hundred meters, so these algorithms work
//! directly in degrees and only convert to meters where a metric is needed.

use geo::{Area, Coord, LineString, Polygon};

use crate::GeoPoint;

/// Meters per degree used by the flat-projection area correction.
const AREA_METERS_PER_DEGREE: f64 = 111_111.0;

/// Number of segments at each end of the polyline excluded from pairing with
/// the other end. Start and end meet near the closure point, so their
/// segments routinely touch without the walk crossing itself.
const CLOSURE_EXCLUDED_SEGMENTS: usize = 2;

#[inline]
fn to_coord(p: &GeoPoint) -> Coord {
    Coord {
        x: p.longitude,
        y: p.latitude,
    }
}

/// Enclosed area of a ring of points in square meters.
///
/// The ring is closed implicitly (last point connects back to the first).
/// The shoelace area is computed in degree² and scaled by a flat projection
/// around the mean latitude. Accurate for pedestrian-scale regions; not
/// geodesically exact for large polygons or near the poles.
///
/// Returns 0 for fewer than 3 points.
///
/// # Example
/// ```
/// use geofence::{GeoPoint, polygon_area};
///
/// let d = 0.00009;
/// let square = vec![
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(0.0, d),
///     GeoPoint::new(d, d),
///     GeoPoint::new(d, 0.0),
/// ];
/// let area = polygon_area(&square);
/// assert!(area > 80.0 && area < 120.0);
/// ```
pub fn polygon_area(points: &[GeoPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let ring = LineString::new(points.iter().map(to_coord).collect());
    let raw_area_deg2 = Polygon::new(ring, vec![]).unsigned_area();

    let mean_lat = points.iter().map(|p| p.latitude).sum::<f64>() / points.len() as f64;
    let meters_per_degree_lat = AREA_METERS_PER_DEGREE;
    let meters_per_degree_lon = AREA_METERS_PER_DEGREE * mean_lat.to_radians().cos();

    (raw_area_deg2 * meters_per_degree_lat * meters_per_degree_lon).abs()
}

/// True if A, B, C wind counter-clockwise.
#[inline]
fn ccw(a: Coord, b: Coord, c: Coord) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Test whether segment `p1-p2` properly crosses segment `p3-p4`.
///
/// Uses the orientation test: the segments intersect when the endpoints of
/// each straddle the other. Collinear overlaps do not count as crossings.
pub fn segments_intersect(p1: &GeoPoint, p2: &GeoPoint, p3: &GeoPoint, p4: &GeoPoint) -> bool {
    let (a, b, c, d) = (to_coord(p1), to_coord(p2), to_coord(p3), to_coord(p4));
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// Check whether the open polyline crosses itself.
///
/// Segment `i` joins points `i` and `i + 1`; the implicit closing segment is
/// not scanned. Every non-adjacent pair `(i, j)` with `j >= i + 2` is tested,
/// except pairs where `i` is among the first two segments and `j` among the
/// last two. Returns on the first crossing found.
///
/// Paths with fewer than 4 points cannot cross themselves.
pub fn has_self_intersection(points: &[GeoPoint]) -> bool {
    if points.len() < 4 {
        return false;
    }

    let segment_count = points.len() - 1;
    let tail_start = segment_count.saturating_sub(CLOSURE_EXCLUDED_SEGMENTS);

    for i in 0..segment_count {
        for j in (i + 2)..segment_count {
            if i < CLOSURE_EXCLUDED_SEGMENTS && j >= tail_start {
                continue;
            }
            if segments_intersect(&points[i], &points[i + 1], &points[j], &points[j + 1]) {
                return true;
            }
        }
    }

    false
}
