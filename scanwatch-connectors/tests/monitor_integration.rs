//! End-to-end tests for the monitor against a temporary data directory

mod common;

use chrono::Duration;
use scanwatch_connectors::{
    ConnectorError, DataDir, Monitor, ObservationSource, ScannerConfig, SimulatedMacScanner,
};
use scanwatch_core::{
    FlagKind, IncidentRecord, MemorySink, NullSink, TimeSource, TriangulationLog,
};

use common::{clock, simulated_monitor, DeadScanner, ScriptedScanner};

#[test]
fn test_history_survives_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let data = DataDir::new(tmp.path());
    let clock = clock();

    {
        let mut monitor = simulated_monitor(&data, &clock);
        monitor.cycle().unwrap();
    }

    clock.advance(Duration::seconds(5));
    let mut monitor = simulated_monitor(&data, &clock);
    monitor.cycle().unwrap();

    let history = data.load_officer_history("123").unwrap().unwrap();
    assert_eq!(history.incidents.len(), 2);
    assert_eq!(history.patterns.total_incidents, 2);
    assert_eq!(history.patterns.incident_type_counts.get("traffic_stop"), Some(&2));
    assert_eq!(
        history.incidents[1].incident_id.as_deref(),
        Some(format!("incident_{}", clock.now().timestamp()).as_str())
    );
}

#[test]
fn test_run_counts_cycles_without_sleeping_on_test_clock() {
    let tmp = tempfile::tempdir().unwrap();
    let data = DataDir::new(tmp.path());
    let clock = clock();
    let mut monitor = simulated_monitor(&data, &clock);

    assert_eq!(monitor.run(Some(0)).unwrap(), 0);
    assert_eq!(monitor.run(Some(3)).unwrap(), 3);
    assert_eq!(
        monitor.aggregator().history("123").unwrap().patterns.total_incidents,
        3
    );
}

#[test]
fn test_triangulation_logs_are_written() {
    let tmp = tempfile::tempdir().unwrap();
    let data = DataDir::new(tmp.path());
    let clock = clock();
    let mut monitor = simulated_monitor(&data, &clock);

    for _ in 0..3 {
        monitor.cycle().unwrap();
        clock.advance(Duration::seconds(30));
    }

    let logs: Vec<_> = std::fs::read_dir(data.logs_dir())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("triangulation_"))
        })
        .collect();
    assert_eq!(logs.len(), 2);

    let text = std::fs::read_to_string(&logs[0]).unwrap();
    let entry: TriangulationLog = serde_json::from_str(&text).unwrap();
    assert_eq!(entry.analysis.total_readings, 3);
    assert_eq!(entry.analysis.triangulation_method, "weighted_average_rssi");
    assert_eq!(entry.signal_readings.len(), 3);
}

#[test]
fn test_report_flags_busy_officer() {
    let tmp = tempfile::tempdir().unwrap();
    let data = DataDir::new(tmp.path());
    let clock = clock();

    let incident = |officer: &str| {
        IncidentRecord::new(clock.now())
            .with_officer(officer)
            .with_type("traffic_stop")
    };
    let mut batch: Vec<_> = (0..51).map(|_| incident("123")).collect();
    batch.push(incident("456"));
    batch.push(IncidentRecord::new(clock.now()).with_type("noise"));

    let sink = MemorySink::new();
    let mut monitor = Monitor::with_sources(
        ScannerConfig::default(),
        data.clone(),
        ScriptedScanner { batches: vec![batch] },
        SimulatedMacScanner::with_devices(Vec::new()),
        &clock,
    )
    .unwrap()
    .with_sinks(Box::new(NullSink), Box::new(sink.clone()));

    assert_eq!(monitor.cycle().unwrap().incidents, 53);

    let (report, path) = monitor.generate_report(None).unwrap();
    assert!(path.exists());
    assert_eq!(report.officer_count(), 2);
    assert_eq!(report.flagged_officers(FlagKind::HighActivity), vec!["123"]);

    let (single, _) = monitor.generate_report(Some("456")).unwrap();
    assert_eq!(single.officers.keys().collect::<Vec<_>>(), vec!["456"]);

    let dropped = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, scanwatch_core::CoreEvent::IncidentDropped { .. }))
        .count();
    assert_eq!(dropped, 1);
}

#[test]
fn test_same_second_incidents_get_distinct_ids() {
    let tmp = tempfile::tempdir().unwrap();
    let data = DataDir::new(tmp.path());
    let clock = clock();

    let batch = vec![
        IncidentRecord::new(clock.now()).with_officer("123").with_type("traffic_stop"),
        IncidentRecord::new(clock.now()).with_officer("123").with_type("pursuit"),
        IncidentRecord::new(clock.now()).with_officer("456").with_type("traffic_stop"),
    ];
    let scripted = ScriptedScanner { batches: vec![batch.clone(), batch] };
    let mut monitor = Monitor::with_sources(
        ScannerConfig::default(),
        data.clone(),
        scripted,
        SimulatedMacScanner::with_devices(Vec::new()),
        &clock,
    )
    .unwrap()
    .with_sinks(Box::new(NullSink), Box::new(NullSink));

    assert_eq!(monitor.cycle().unwrap().incidents, 3);
    let secs = clock.now().timestamp();
    let mut files: Vec<_> = std::fs::read_dir(data.incidents_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec![
            format!("incident_{secs}.json"),
            format!("incident_{secs}_1.json"),
            format!("incident_{secs}_2.json"),
        ]
    );

    // A second batch in the same second continues the sequence
    assert_eq!(monitor.cycle().unwrap().incidents, 3);
    assert_eq!(std::fs::read_dir(data.incidents_dir()).unwrap().count(), 6);

    let history = data.load_officer_history("123").unwrap().unwrap();
    let ids: Vec<_> = history
        .incidents
        .iter()
        .map(|i| i.incident_id.clone().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            format!("incident_{secs}"),
            format!("incident_{secs}_1"),
            format!("incident_{secs}_3"),
            format!("incident_{secs}_4"),
        ]
    );
}

#[test]
fn test_source_failure_stops_the_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    let data = DataDir::new(tmp.path());
    let clock = clock();

    let scanner: Box<dyn ObservationSource<Observation = IncidentRecord>> = Box::new(DeadScanner);
    let mut monitor = Monitor::with_sources(
        ScannerConfig::default(),
        data,
        scanner,
        SimulatedMacScanner::new(),
        &clock,
    )
    .unwrap();

    let err = monitor.run(None).unwrap_err();
    assert!(matches!(err, ConnectorError::SourceFailed { .. }));
    assert!(monitor.store().is_empty());
}

#[test]
fn test_invalid_station_is_rejected_up_front() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = ScannerConfig::default();
    config.location.longitude = -200.0;

    let result = Monitor::new(config, DataDir::new(tmp.path()));
    assert!(matches!(result, Err(ConnectorError::Validation(_))));
}
