//! Command implementations

use std::fs;

use anyhow::{Context, Result};
use scanwatch_connectors::{
    DataDir, Monitor, ObservationSource, ScannerConfig, SimulatedMacScanner, SimulatedScanner,
};
use scanwatch_core::{
    Position, SignalStore, SystemTime, TimeSource, TriangulationEstimate, Triangulator,
};

use crate::{Commands, ReportArgs, StartArgs, TestArgs, TriangulateArgs};

/// Demo stations used by `triangulate`: (dBm, position)
pub const DEMO_STATIONS: [(f64, Position); 3] = [
    (-45.0, Position::new(40.7128, -74.0060)),
    (-60.0, Position::new(40.7130, -74.0058)),
    (-55.0, Position::new(40.7126, -74.0062)),
];

pub fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Start(args) => execute_start(args),
        Commands::Report(args) => execute_report(args),
        Commands::Test(args) => execute_test(args),
        Commands::Triangulate(args) => execute_triangulate(args),
    }
}

fn execute_start(args: StartArgs) -> Result<()> {
    println!("Starting Police Scanner Accountability System...");

    let config = ScannerConfig::load_or_create(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    let mut monitor = Monitor::new(config, DataDir::new(&args.data_dir))
        .context("Failed to prepare data directory")?;

    let completed = monitor.run(args.cycles).context("Monitoring stopped with an error")?;
    tracing::info!("Completed {completed} monitoring cycles");
    Ok(())
}

fn execute_report(args: ReportArgs) -> Result<()> {
    println!("Generating accountability report...");

    let data = DataDir::new(&args.data_dir);
    let report = data
        .build_report(SystemTime.now(), args.officer.as_deref())
        .context("Failed to read officer histories")?;
    let saved = data.save_report(&report).context("Failed to save report")?;
    tracing::info!("Report archived at {}", saved.display());

    let json = serde_json::to_string_pretty(&report)?;
    match args.output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Report saved to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn execute_test(args: TestArgs) -> Result<()> {
    println!("Running system test...");

    let config = ScannerConfig::load_or_create(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    let now = SystemTime.now();

    println!("Testing scanner monitoring...");
    let transmission = SimulatedScanner::new()
        .poll(now)?
        .into_iter()
        .next()
        .context("Scanner returned no transmission")?;
    println!(
        "✓ Scanner monitoring: {}",
        transmission.incident_type.as_deref().unwrap_or("unknown")
    );

    println!("Testing MAC address tracking...");
    let detections = SimulatedMacScanner::new().poll(now)?;
    println!("✓ MAC tracking: {} devices detected", detections.len());

    println!("Testing report generation...");
    let mut monitor = Monitor::new(config, DataDir::new(&args.data_dir))?;
    monitor.cycle().context("Monitoring cycle failed")?;
    let (report, _) = monitor.generate_report(None)?;
    println!("✓ Report generation: {} officers tracked", report.officer_count());

    println!("All tests passed!");
    Ok(())
}

fn execute_triangulate(args: TriangulateArgs) -> Result<()> {
    println!("Testing triangulation for MAC: {}", args.mac);

    let estimate = triangulate_demo(&args.mac)?;
    for line in triangulation_lines(estimate.as_ref()) {
        println!("{line}");
    }
    Ok(())
}

/// Triangulate `mac` from the three demo station readings
pub fn triangulate_demo(mac: &str) -> Result<Option<TriangulationEstimate>> {
    let mut store = SignalStore::new();
    for (dbm, position) in DEMO_STATIONS {
        store
            .add_reading(mac, dbm, position, None)
            .with_context(|| format!("Invalid MAC address '{mac}'"))?;
    }
    Ok(Triangulator::default().triangulate_position(&store, mac))
}

/// Console lines for a triangulation outcome
pub fn triangulation_lines(estimate: Option<&TriangulationEstimate>) -> Vec<String> {
    match estimate {
        Some(e) => vec![
            format!(
                "Triangulated position: {:.6}, {:.6}",
                e.estimated_latitude, e.estimated_longitude
            ),
            format!("Confidence: {:.2}", e.confidence),
        ],
        None => vec!["Triangulation failed".to_string()],
    }
}
