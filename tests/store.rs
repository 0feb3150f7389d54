//! Tests for the territory registry and sinks

mod common;

use std::sync::mpsc;

use common::{approx_eq, happy_loop, local, square};
use geofence::{
    Bounds, GeoPoint, GeofenceError, TerritoryCandidate, TerritoryRegistry, TerritorySink,
    format_area, polygon_area,
};

fn candidate_at(east_m: f64, north_m: f64) -> TerritoryCandidate {
    let path: Vec<GeoPoint> = square(40.0)
        .iter()
        .map(|p| {
            let offset = local(east_m, north_m);
            GeoPoint::new(
                p.latitude + offset.latitude - common::ORIGIN_LAT,
                p.longitude + offset.longitude - common::ORIGIN_LNG,
            )
        })
        .collect();
    let area = polygon_area(&path);
    TerritoryCandidate::new(path, area)
}

#[test]
fn test_insert_assigns_identity() {
    let mut registry = TerritoryRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.default_name(), "Territory #1");

    let record = registry.insert(candidate_at(0.0, 0.0)).unwrap();
    assert_eq!(record.id, "territory-1");
    assert_eq!(record.name, "Territory #1");
    assert_eq!(record.path.len(), 4);
    assert!(record.created_at > 0);
    assert!(record.bounds.contains(&local(20.0, 20.0)));

    let record = registry.insert(candidate_at(500.0, 0.0)).unwrap();
    assert_eq!(record.id, "territory-2");
    assert_eq!(record.name, "Territory #2");
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_insert_rejects_degenerate_paths() {
    let mut registry = TerritoryRegistry::new();

    let short = TerritoryCandidate::new(vec![local(0.0, 0.0), local(10.0, 0.0)], 0.0);
    assert!(matches!(
        registry.insert(short),
        Err(GeofenceError::InsufficientPoints { point_count: 2, .. })
    ));

    let bad = TerritoryCandidate::new(
        vec![local(0.0, 0.0), GeoPoint::new(100.0, 0.0), local(10.0, 10.0)],
        50.0,
    );
    assert!(matches!(
        registry.insert(bad),
        Err(GeofenceError::InvalidCoordinate { .. })
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_list_newest_first_and_total_area() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();
    registry.insert(candidate_at(500.0, 0.0)).unwrap();
    registry.insert(candidate_at(1000.0, 0.0)).unwrap();

    let ids: Vec<&str> = registry.list().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["territory-3", "territory-2", "territory-1"]);

    // Three 40 m squares
    assert!(approx_eq(registry.total_area(), 4800.0, 30.0));
    assert_eq!(format_area(registry.total_area()), "4.8k m²");
}

#[test]
fn test_rename() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();

    registry.rename("territory-1", "Park loop").unwrap();
    assert_eq!(registry.get("territory-1").unwrap().name, "Park loop");

    assert!(matches!(
        registry.rename("territory-9", "Nope"),
        Err(GeofenceError::TerritoryNotFound { .. })
    ));
}

#[test]
fn test_remove() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();
    registry.insert(candidate_at(500.0, 0.0)).unwrap();

    let removed = registry.remove("territory-1").unwrap();
    assert_eq!(removed.id, "territory-1");
    assert_eq!(registry.len(), 1);
    assert!(registry.get("territory-1").is_none());

    let err = registry.remove("territory-1").unwrap_err();
    assert_eq!(err.to_string(), "territory 'territory-1' not found");

    // Ids are not reused
    let record = registry.insert(candidate_at(0.0, 500.0)).unwrap();
    assert_eq!(record.id, "territory-3");
}

#[test]
fn test_clear() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();
    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(registry.total_area(), 0.0);
    assert!(registry.find_nearby(&local(0.0, 0.0), 100.0).is_empty());
}

#[test]
fn test_viewport_query() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();
    registry.insert(candidate_at(2000.0, 0.0)).unwrap();

    let sw = local(-50.0, -50.0);
    let ne = local(100.0, 100.0);
    let viewport = Bounds {
        min_lat: sw.latitude,
        max_lat: ne.latitude,
        min_lng: sw.longitude,
        max_lng: ne.longitude,
    };
    assert_eq!(registry.query_viewport(&viewport), vec!["territory-1"]);
}

#[test]
fn test_find_nearby_sees_new_and_removed_records() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();

    let probe = local(20.0, 20.0);
    assert_eq!(registry.find_nearby(&probe, 50.0), vec!["territory-1"]);

    registry.insert(candidate_at(60.0, 0.0)).unwrap();
    let mut nearby = registry.find_nearby(&probe, 50.0);
    nearby.sort();
    assert_eq!(nearby, vec!["territory-1", "territory-2"]);

    registry.remove("territory-1").unwrap();
    assert_eq!(registry.find_nearby(&probe, 50.0), vec!["territory-2"]);

    assert!(registry.find_nearby(&local(5000.0, 5000.0), 50.0).is_empty());
}

#[test]
fn test_json_snapshot_round_trip() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();
    registry.insert(candidate_at(500.0, 0.0)).unwrap();
    registry.rename("territory-2", "River bend").unwrap();

    let json = registry.to_json().unwrap();
    assert!(json.contains("\"createdAt\""));

    let mut restored = TerritoryRegistry::from_json(&json).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.get("territory-2").unwrap().name, "River bend");
    assert_eq!(restored.find_nearby(&local(20.0, 20.0), 10.0), vec!["territory-1"]);

    // Numbering continues after the highest restored id
    let record = restored.insert(candidate_at(0.0, 500.0)).unwrap();
    assert_eq!(record.id, "territory-3");
}

#[test]
fn test_json_snapshot_recomputes_bounds() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();

    // Stored bounds pointing somewhere else entirely
    let json = registry.to_json().unwrap();
    let mut snapshot: serde_json::Value = serde_json::from_str(&json).unwrap();
    snapshot[0]["bounds"] = serde_json::json!({
        "min_lat": 10.0,
        "max_lat": 11.0,
        "min_lng": 10.0,
        "max_lng": 11.0,
    });

    let mut restored = TerritoryRegistry::from_json(&snapshot.to_string()).unwrap();
    let record = restored.get("territory-1").unwrap();
    assert!(record.bounds.contains(&local(20.0, 20.0)));
    assert_eq!(restored.find_nearby(&local(20.0, 20.0), 10.0), vec!["territory-1"]);
    assert!(restored.find_nearby(&GeoPoint::new(10.5, 10.5), 10.0).is_empty());
}

#[test]
fn test_json_snapshot_rejects_out_of_range_points() {
    let mut registry = TerritoryRegistry::new();
    registry.insert(candidate_at(0.0, 0.0)).unwrap();

    let json = registry.to_json().unwrap();
    let mut snapshot: serde_json::Value = serde_json::from_str(&json).unwrap();
    snapshot[0]["path"][1]["latitude"] = serde_json::json!(120.0);

    assert!(matches!(
        TerritoryRegistry::from_json(&snapshot.to_string()),
        Err(GeofenceError::InvalidCoordinate { .. })
    ));
}

#[test]
fn test_json_snapshot_rejects_garbage() {
    assert!(matches!(
        TerritoryRegistry::from_json("not json"),
        Err(GeofenceError::Json(_))
    ));
    assert!(TerritoryRegistry::from_json("[]").unwrap().is_empty());
}

#[test]
fn test_registry_as_sink() {
    let mut registry = TerritoryRegistry::new();
    let path = happy_loop();
    let area = polygon_area(&path);
    registry.save(TerritoryCandidate::new(path, area)).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_channel_sink_fails_without_receiver() {
    let (mut tx, rx) = mpsc::channel::<TerritoryCandidate>();
    tx.save(candidate_at(0.0, 0.0)).unwrap();
    assert_eq!(rx.try_recv().unwrap().path.len(), 4);

    drop(rx);
    assert!(matches!(
        tx.save(candidate_at(0.0, 0.0)),
        Err(GeofenceError::SinkUnavailable(_))
    ));
}
