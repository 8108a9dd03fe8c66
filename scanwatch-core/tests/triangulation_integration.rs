//! Integration tests for the store → triangulator path
//!
//! Covers:
//! - The reference three-station scenario
//! - Hard three-reading threshold and device filtering
//! - Recency selection across interleaved devices
//! - Event reporting through an injected sink

mod common;

use chrono::Duration;
use proptest::prelude::*;
use scanwatch_core::{
    events::SkipReason, CoreEvent, FixedTime, MemorySink, NullSink, Position, SignalStore,
    TimeSource, Triangulator,
};

use common::{assert_between, clock, station_store, POLICE_RADIO, POLICE_VEHICLE, STATIONS};

#[test]
fn test_reference_scenario() {
    let clock = clock();
    let store = station_store(&clock, POLICE_RADIO);

    let estimate = Triangulator::default()
        .triangulate_position(&store, POLICE_RADIO)
        .expect("three readings triangulate");

    assert_eq!(estimate.device_id, POLICE_RADIO);
    assert_eq!(estimate.readings_used, 3);
    assert_eq!(estimate.confidence, 1.0);
    assert_between(estimate.estimated_latitude, 40.7126, 40.7130);
    assert_between(estimate.estimated_longitude, -74.0062, -74.0058);
}

#[test]
fn test_zero_one_two_readings_are_absent() {
    let clock = clock();
    let mut store = SignalStore::with_clock(&clock).with_sink(Box::new(NullSink));
    let triangulator = Triangulator::default();

    for (dbm, position) in STATIONS.iter().take(2) {
        assert!(triangulator.triangulate_position(&store, POLICE_RADIO).is_none());
        store.add_reading(POLICE_RADIO, *dbm, *position, None).unwrap();
    }
    assert!(triangulator.triangulate_position(&store, POLICE_RADIO).is_none());

    let (dbm, position) = STATIONS[2];
    store.add_reading(POLICE_RADIO, dbm, position, None).unwrap();
    assert!(triangulator.triangulate_position(&store, POLICE_RADIO).is_some());
}

#[test]
fn test_other_device_readings_do_not_count() {
    let clock = clock();
    let store = station_store(&clock, POLICE_VEHICLE);

    assert!(Triangulator::default()
        .triangulate_position(&store, POLICE_RADIO)
        .is_none());
}

#[test]
fn test_interleaved_devices_use_own_latest_readings() {
    let clock = clock();
    let mut store = SignalStore::with_clock(&clock).with_sink(Box::new(NullSink));

    for (i, (dbm, position)) in STATIONS.iter().enumerate() {
        clock.advance(Duration::seconds(10));
        store.add_reading(POLICE_RADIO, *dbm, *position, None).unwrap();
        // Vehicle sits far away; its readings must never leak into the radio fix
        store
            .add_reading(POLICE_VEHICLE, -20.0, Position::new(41.0 + i as f64, -73.0), None)
            .unwrap();
    }

    let radio = Triangulator::default()
        .triangulate_position(&store, POLICE_RADIO)
        .unwrap();
    assert_between(radio.estimated_latitude, 40.7126, 40.7130);

    let vehicle = Triangulator::default()
        .triangulate_position(&store, POLICE_VEHICLE)
        .unwrap();
    assert!((vehicle.estimated_latitude - 42.0).abs() < 1e-9);
}

#[test]
fn test_newer_readings_replace_older_ones() {
    let clock = clock();
    let mut store = station_store(&clock, POLICE_RADIO);

    clock.advance(Duration::minutes(5));
    for _ in 0..3 {
        store
            .add_reading(POLICE_RADIO, -50.0, Position::new(40.8000, -73.9000), None)
            .unwrap();
    }

    let estimate = Triangulator::default()
        .triangulate_position(&store, POLICE_RADIO)
        .unwrap();
    assert!((estimate.estimated_latitude - 40.8).abs() < 1e-9);
    assert!((estimate.estimated_longitude + 73.9).abs() < 1e-9);
    assert_eq!(estimate.timestamp, clock.now());
}

#[test]
fn test_outcomes_reach_the_sink() {
    let clock = clock();
    let sink = MemorySink::new();
    let mut store = SignalStore::with_clock(&clock).with_sink(Box::new(sink.clone()));
    let triangulator = Triangulator::default();

    triangulator.triangulate_position(&store, POLICE_RADIO);
    for (dbm, position) in STATIONS {
        store.add_reading(POLICE_RADIO, dbm, position, None).unwrap();
    }
    let estimate = triangulator.triangulate_position(&store, POLICE_RADIO).unwrap();

    let events = sink.events();
    assert_eq!(
        events.first(),
        Some(&CoreEvent::TriangulationSkipped {
            device_id: POLICE_RADIO.to_string(),
            reason: SkipReason::InsufficientData { required: 3, available: 0 },
        })
    );
    assert_eq!(
        events.iter().filter(|e| matches!(e, CoreEvent::ReadingRecorded { .. })).count(),
        3
    );
    assert_eq!(events.last(), Some(&CoreEvent::PositionEstimated(estimate)));
}

#[test]
fn test_estimate_serializes_every_field() {
    let clock = clock();
    let store = station_store(&clock, POLICE_RADIO);
    let estimate = Triangulator::default()
        .triangulate_position(&store, POLICE_RADIO)
        .unwrap();

    let json = serde_json::to_value(&estimate).unwrap();
    for field in [
        "device_id",
        "estimated_latitude",
        "estimated_longitude",
        "confidence",
        "readings_used",
        "timestamp",
    ] {
        assert!(json.get(field).is_some(), "missing {field}");
    }
}

proptest! {
    #[test]
    fn estimate_stays_inside_sensor_box(
        readings in proptest::collection::vec(
            (-120.0f64..10.0, -89.0f64..89.0, -179.0f64..179.0),
            3..12,
        )
    ) {
        let clock = FixedTime::at(common::EPOCH).unwrap();
        let mut store = SignalStore::with_clock(&clock).with_sink(Box::new(NullSink));
        for (dbm, lat, lon) in &readings {
            clock.advance(Duration::seconds(1));
            store.add_reading("dev", *dbm, (*lat, *lon), None).unwrap();
        }

        let estimate = Triangulator::default().triangulate_position(&store, "dev").unwrap();
        let used = &readings[readings.len() - 3..];
        let lat_min = used.iter().map(|r| r.1).fold(f64::INFINITY, f64::min);
        let lat_max = used.iter().map(|r| r.1).fold(f64::NEG_INFINITY, f64::max);
        let lon_min = used.iter().map(|r| r.2).fold(f64::INFINITY, f64::min);
        let lon_max = used.iter().map(|r| r.2).fold(f64::NEG_INFINITY, f64::max);

        prop_assert!(estimate.estimated_latitude >= lat_min - 1e-9);
        prop_assert!(estimate.estimated_latitude <= lat_max + 1e-9);
        prop_assert!(estimate.estimated_longitude >= lon_min - 1e-9);
        prop_assert!(estimate.estimated_longitude <= lon_max + 1e-9);
        prop_assert_eq!(estimate.confidence, 1.0);
    }
}
