//! Tests for polygon area and self-intersection

mod common;

use common::{approx_eq, figure_eight, happy_loop, local, square};
use geofence::{GeoPoint, has_self_intersection, polygon_area, segments_intersect};

// ============================================================================
// Area
// ============================================================================

#[test]
fn test_small_square_area_at_equator() {
    let d = 0.00009;
    let square = vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, d),
        GeoPoint::new(d, d),
        GeoPoint::new(d, 0.0),
    ];
    let area = polygon_area(&square);
    assert!(area > 80.0 && area < 120.0, "area was {}", area);
}

#[test]
fn test_local_square_area() {
    let area = polygon_area(&square(10.0));
    assert!(approx_eq(area, 100.0, 1.0), "area was {}", area);

    let area = polygon_area(&square(50.0));
    assert!(approx_eq(area, 2500.0, 10.0), "area was {}", area);
}

#[test]
fn test_area_is_orientation_independent() {
    let ccw = square(20.0);
    let mut cw = ccw.clone();
    cw.reverse();

    let a = polygon_area(&ccw);
    let b = polygon_area(&cw);
    assert!(a > 0.0);
    assert!(approx_eq(a, b, 1e-6));
}

#[test]
fn test_area_fewer_than_three_points() {
    assert_eq!(polygon_area(&[]), 0.0);
    assert_eq!(polygon_area(&[local(0.0, 0.0)]), 0.0);
    assert_eq!(polygon_area(&[local(0.0, 0.0), local(50.0, 0.0)]), 0.0);
}

#[test]
fn test_area_of_collinear_points_is_zero() {
    let line = vec![local(0.0, 0.0), local(10.0, 0.0), local(20.0, 0.0)];
    assert!(polygon_area(&line) < 1e-6);
}

#[test]
fn test_triangle_area() {
    let triangle = vec![local(0.0, 0.0), local(40.0, 0.0), local(0.0, 30.0)];
    let area = polygon_area(&triangle);
    assert!(approx_eq(area, 600.0, 5.0), "area was {}", area);
}

#[test]
fn test_happy_loop_area() {
    // Regular 12-gon with 20 m circumradius: 3 * r^2
    let area = polygon_area(&happy_loop());
    assert!(approx_eq(area, 1200.0, 10.0), "area was {}", area);
}

// ============================================================================
// Segment Intersection
// ============================================================================

#[test]
fn test_crossing_segments() {
    let a = local(0.0, 0.0);
    let b = local(10.0, 10.0);
    let c = local(0.0, 10.0);
    let d = local(10.0, 0.0);
    assert!(segments_intersect(&a, &b, &c, &d));
    assert!(segments_intersect(&c, &d, &a, &b));
}

#[test]
fn test_disjoint_segments() {
    let a = local(0.0, 0.0);
    let b = local(10.0, 0.0);
    let c = local(0.0, 5.0);
    let d = local(10.0, 5.0);
    assert!(!segments_intersect(&a, &b, &c, &d));
}

#[test]
fn test_collinear_overlap_is_not_a_crossing() {
    let a = local(0.0, 0.0);
    let b = local(10.0, 0.0);
    let c = local(5.0, 0.0);
    let d = local(15.0, 0.0);
    assert!(!segments_intersect(&a, &b, &c, &d));
}

// ============================================================================
// Self-Intersection
// ============================================================================

#[test]
fn test_simple_loops_do_not_cross() {
    assert!(!has_self_intersection(&happy_loop()));
    assert!(!has_self_intersection(&square(30.0)));
}

#[test]
fn test_figure_eight_crosses() {
    assert!(has_self_intersection(&figure_eight()));
}

#[test]
fn test_self_intersection_is_direction_independent() {
    let mut reversed = figure_eight();
    reversed.reverse();
    assert!(has_self_intersection(&reversed));

    let mut reversed = happy_loop();
    reversed.reverse();
    assert!(!has_self_intersection(&reversed));
}

#[test]
fn test_fewer_than_four_points_never_cross() {
    let three = vec![local(0.0, 0.0), local(10.0, 10.0), local(0.0, 10.0)];
    assert!(!has_self_intersection(&three));
    assert!(!has_self_intersection(&[]));
}

#[test]
fn test_bowtie_crossing_near_both_ends_is_ignored() {
    // Four points: segment 0 and segment 2 form the X, but both sit in the
    // excluded start/end window
    let bowtie = vec![
        local(0.0, 0.0),
        local(20.0, 20.0),
        local(20.0, 0.0),
        local(0.0, 20.0),
    ];
    assert!(!has_self_intersection(&bowtie));

    // Two more segments move segment 2 out of the end window
    let mut extended = bowtie.clone();
    extended.extend([local(-10.0, 10.0), local(-10.0, -10.0)]);
    assert!(has_self_intersection(&extended));
}

#[test]
fn test_crossing_between_start_and_end_segments_is_ignored() {
    // The last segment overshoots across the first one near the start
    let overshoot = vec![
        local(0.0, 0.0),
        local(20.0, 0.0),
        local(40.0, 0.0),
        local(40.0, 20.0),
        local(40.0, 40.0),
        local(20.0, 40.0),
        local(0.0, 40.0),
        local(0.0, 20.0),
        local(10.0, -10.0),
    ];
    assert!(!has_self_intersection(&overshoot));

    // The same crossing in the middle of a longer walk is detected
    let mut longer = overshoot.clone();
    longer.extend([local(30.0, -10.0), local(50.0, -10.0), local(50.0, -30.0)]);
    assert!(has_self_intersection(&longer));
}
