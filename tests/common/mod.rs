//! Shared loop fixtures for integration tests.
//!
//! Points are laid out in local east/north meters around an origin and
//! converted with the same flat projection the area calculation uses, so
//! expected areas can be computed by hand.

#![allow(dead_code)]

use geofence::{GeoPoint, Sample};

pub const ORIGIN_LAT: f64 = 31.2304;
pub const ORIGIN_LNG: f64 = 121.4737;

const METERS_PER_DEGREE: f64 = 111_111.0;

pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Point at a local offset (meters) from the origin.
pub fn local(east_m: f64, north_m: f64) -> GeoPoint {
    GeoPoint::new(
        ORIGIN_LAT + north_m / METERS_PER_DEGREE,
        ORIGIN_LNG + east_m / (METERS_PER_DEGREE * ORIGIN_LAT.to_radians().cos()),
    )
}

/// `count` points evenly spaced on a circle, starting due east.
pub fn circle(radius_m: f64, count: usize) -> Vec<GeoPoint> {
    (0..count)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / count as f64;
            local(radius_m * angle.cos(), radius_m * angle.sin())
        })
        .collect()
}

/// The 12-point loop of ~40 m diameter used for the happy path.
pub fn happy_loop() -> Vec<GeoPoint> {
    circle(20.0, 12)
}

/// 14 points shaped like an hourglass: the two diagonals cross once in the
/// middle of the walk, far from its start and end.
pub fn figure_eight() -> Vec<GeoPoint> {
    [
        (0.0, 0.0),
        (20.0, 0.0),
        (40.0, 0.0),
        (60.0, 0.0),
        (45.0, 15.0),
        (15.0, 45.0),
        (0.0, 60.0),
        (20.0, 60.0),
        (40.0, 60.0),
        (60.0, 60.0),
        (40.0, 40.0),
        (20.0, 20.0),
        (12.0, 12.0),
        (2.0, 2.0),
    ]
    .iter()
    .map(|&(e, n)| local(e, n))
    .collect()
}

/// Square of the given side length, counter-clockwise from the origin.
pub fn square(side_m: f64) -> Vec<GeoPoint> {
    vec![
        local(0.0, 0.0),
        local(side_m, 0.0),
        local(side_m, side_m),
        local(0.0, side_m),
    ]
}

/// Timestamp points at a fixed interval, starting at `t0`.
pub fn timed(points: &[GeoPoint], t0: f64, interval_secs: f64) -> Vec<Sample> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| Sample::new(*p, t0 + i as f64 * interval_secs))
        .collect()
}
