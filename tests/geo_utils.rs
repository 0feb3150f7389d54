//! Tests for geo_utils module

mod common;

use common::{approx_eq, local};
use geofence::geo_utils::*;
use geofence::{Bounds, GeoPoint};

#[test]
fn test_haversine_distance_same_point() {
    let p = GeoPoint::new(31.2304, 121.4737);
    assert_eq!(haversine_distance(&p, &p), 0.0);
}

#[test]
fn test_haversine_distance_known_value() {
    // London to Paris is approximately 344 km
    let london = GeoPoint::new(51.5074, -0.1278);
    let paris = GeoPoint::new(48.8566, 2.3522);
    let dist = haversine_distance(&london, &paris);
    assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
}

#[test]
fn test_haversine_distance_is_symmetric() {
    let a = local(0.0, 0.0);
    let b = local(30.0, 40.0);
    assert!(approx_eq(
        haversine_distance(&a, &b),
        haversine_distance(&b, &a),
        1e-9
    ));
    assert!(approx_eq(haversine_distance(&a, &b), 50.0, 0.5));
}

#[test]
fn test_path_length_excludes_closing_segment() {
    let points = vec![local(0.0, 0.0), local(10.0, 0.0), local(10.0, 10.0)];
    let length = path_length(&points);
    assert!(approx_eq(length, 20.0, 0.1));
}

#[test]
fn test_path_length_short_inputs() {
    assert_eq!(path_length(&[]), 0.0);
    assert_eq!(path_length(&[local(0.0, 0.0)]), 0.0);
}

#[test]
fn test_bounds_from_points() {
    let track = vec![
        GeoPoint::new(51.50, -0.13),
        GeoPoint::new(51.51, -0.12),
        GeoPoint::new(51.505, -0.125),
    ];
    let bounds = Bounds::from_points(&track).unwrap();
    assert_eq!(bounds.min_lat, 51.50);
    assert_eq!(bounds.max_lat, 51.51);
    assert_eq!(bounds.min_lng, -0.13);
    assert_eq!(bounds.max_lng, -0.12);
}

#[test]
fn test_bounds_from_no_points() {
    assert!(Bounds::from_points(&[]).is_none());
}

#[test]
fn test_bounds_contains_and_center() {
    let bounds = Bounds {
        min_lat: 10.0,
        max_lat: 12.0,
        min_lng: 20.0,
        max_lng: 24.0,
    };
    assert!(bounds.contains(&GeoPoint::new(11.0, 22.0)));
    assert!(bounds.contains(&GeoPoint::new(10.0, 20.0))); // Inclusive edge
    assert!(!bounds.contains(&GeoPoint::new(12.5, 22.0)));
    let center = bounds.center();
    assert_eq!(center.latitude, 11.0);
    assert_eq!(center.longitude, 22.0);
}

#[test]
fn test_meters_to_degrees_widens_with_latitude() {
    let at_equator = meters_to_degrees(1000.0, 0.0);
    let at_60 = meters_to_degrees(1000.0, 60.0);
    assert!(approx_eq(at_equator, 1000.0 / METERS_PER_DEGREE, 1e-9));
    assert!(approx_eq(at_60, 2.0 * at_equator, 1e-6));
}

#[test]
fn test_speed_kmh() {
    let speed = speed_kmh(100.0, 10.0).unwrap();
    assert!(approx_eq(speed, 36.0, 1e-9));
    assert_eq!(speed_kmh(0.0, 10.0), Some(0.0));
}

#[test]
fn test_speed_kmh_needs_positive_elapsed() {
    assert_eq!(speed_kmh(100.0, 0.0), None);
    assert_eq!(speed_kmh(100.0, -5.0), None);
}
