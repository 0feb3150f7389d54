//! geofence CLI - Debug tool for loop tracking and territory validation
//!
//! Usage:
//!   geofence-cli replay <files...> [--config <json>] [--verbose]
//!   geofence-cli validate <files...> [--config <json>]
//!   geofence-cli simulate [--shape circle|square|figure-eight] [--radius <m>] [--noise <m>]
//!
//! Replays recorded GPX walks through a tracking session and shows every
//! decision the engine makes, helping to understand why a loop was or was
//! not accepted as a territory.

use clap::{Parser, Subcommand, ValueEnum};
use geofence::synthetic::{LoopShape, SyntheticLoop};
use geofence::{
    EventJournal, GeoPoint, Sample, SampleOutcome, TerritoryRegistry, TrackingConfig,
    TrackingEvent, TrackingObserver, TrackingSession, format_area, geo_utils::path_length,
    validate_batch,
};
use gpx::{Gpx, read};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

/// Seconds between samples when a GPX file carries no timestamps.
const FALLBACK_SAMPLE_INTERVAL_SECS: f64 = 5.0;

#[derive(Parser)]
#[command(name = "geofence-cli")]
#[command(about = "Debug tool for loop tracking and territory validation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file overriding tracking thresholds
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed GPX track points through a tracking session
    Replay {
        /// GPX files to replay
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Validate each GPX track as a finished loop
    Validate {
        /// GPX files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Generate a synthetic walk and replay it
    Simulate {
        #[arg(short, long, value_enum, default_value = "circle")]
        shape: ShapeArg,

        /// Radius, half-side or half-width in meters
        #[arg(short, long, default_value = "25")]
        radius: f64,

        /// GPS noise standard deviation in meters
        #[arg(short, long, default_value = "0")]
        noise: f64,

        /// Walking speed in km/h
        #[arg(long, default_value = "5")]
        speed: f64,

        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Circle,
    Square,
    FigureEight,
}

impl From<ShapeArg> for LoopShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Circle => LoopShape::Circle,
            ShapeArg::Square => LoopShape::Square,
            ShapeArg::FigureEight => LoopShape::FigureEight,
        }
    }
}

/// Prints events as they happen.
struct ConsoleObserver {
    verbose: bool,
}

impl TrackingObserver for ConsoleObserver {
    fn on_event(&self, event: &TrackingEvent) {
        match event {
            TrackingEvent::PathPointAdded { count } => {
                if self.verbose {
                    println!("    + point {}", count);
                }
            }
            TrackingEvent::SpeedWarning {
                speed_kmh,
                severity,
            } => println!("    ! speed {:.1} km/h ({:?})", speed_kmh, severity),
            TrackingEvent::ValidationCompleted { result } => match result.failure_reason {
                None => println!("    = VALID territory, {}", format_area(result.area)),
                Some(reason) => println!(
                    "    = REJECTED ({}) after {} points, {:.0}m walked",
                    reason.as_str(),
                    result.point_count,
                    result.path_length_m
                ),
            },
            other => {
                if self.verbose {
                    println!("    - {}", other.name());
                }
            }
        }
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(2);
        }
    };

    match cli.command {
        Commands::Replay { files } => run_replay(&files, &config, cli.verbose),
        Commands::Validate { files } => run_validate(&files, &config),
        Commands::Simulate {
            shape,
            radius,
            noise,
            speed,
            seed,
        } => {
            let walk = SyntheticLoop {
                shape: shape.into(),
                size_m: radius,
                noise_sigma_m: noise,
                speed_kmh: speed,
                seed,
                ..SyntheticLoop::new(GeoPoint::new(47.3769, 8.5417))
            };
            let samples = walk.generate();
            println!(
                "Generated {} samples ({:.0}m walked)",
                samples.len(),
                path_length(&walk.points())
            );
            replay_samples("simulated", &samples, &config, cli.verbose);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<TrackingConfig, String> {
    match path {
        None => Ok(TrackingConfig::default()),
        Some(p) => {
            let json = fs::read_to_string(p).map_err(|e| e.to_string())?;
            TrackingConfig::from_json_str(&json).map_err(|e| e.to_string())
        }
    }
}

/// Parse a single GPX file into timestamped samples
fn parse_gpx_file(path: &Path) -> Result<Vec<Sample>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);
    let gpx: Gpx = read(reader).map_err(|e| e.to_string())?;

    let mut samples = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for pt in &segment.points {
                let point = GeoPoint::new(pt.point().y(), pt.point().x());
                let timestamp = match pt.time {
                    Some(t) => {
                        let dt: OffsetDateTime = t.into();
                        dt.unix_timestamp_nanos() as f64 / 1e9
                    }
                    None => samples.len() as f64 * FALLBACK_SAMPLE_INTERVAL_SECS,
                };
                samples.push(Sample::new(point, timestamp));
            }
        }
    }

    if samples.is_empty() {
        return Err("No track points found".to_string());
    }
    Ok(samples)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Replay GPX files one by one
fn run_replay(files: &[PathBuf], config: &TrackingConfig, verbose: bool) {
    for path in files {
        match parse_gpx_file(path) {
            Ok(samples) => replay_samples(&file_label(path), &samples, config, verbose),
            Err(e) => eprintln!("  [ERR] Failed to parse {}: {}", path.display(), e),
        }
    }
}

fn replay_samples(label: &str, samples: &[Sample], config: &TrackingConfig, verbose: bool) {
    println!("\n{}", "=".repeat(60));
    println!("REPLAY: {} ({} samples)", label, samples.len());
    println!("{}", "=".repeat(60));

    let mut session = match TrackingSession::with_config(config.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("  [ERR] {}", e);
            return;
        }
    };

    let registry = Arc::new(Mutex::new(TerritoryRegistry::new()));
    let journal = Arc::new(EventJournal::new());
    session.add_observer(Arc::new(ConsoleObserver { verbose }));
    session.add_observer(journal.clone());
    session.set_sink(Arc::clone(&registry));
    session.start();

    let mut rejected = 0;
    let mut discarded = 0;
    let mut invalid = 0;

    for sample in samples {
        match session.process_sample(*sample) {
            SampleOutcome::Rejected { .. } => {
                rejected += 1;
                if session.resume() && verbose {
                    println!("    (resumed after pause)");
                }
            }
            SampleOutcome::Discarded => discarded += 1,
            SampleOutcome::Invalid => invalid += 1,
            _ => {}
        }
    }
    session.stop();

    println!("\n  Summary:");
    println!("    Rejected for speed: {}", rejected);
    println!("    Discarded as noise: {}", discarded);
    println!("    Invalid coordinates: {}", invalid);
    println!("    Open path points:   {}", session.path().len());

    match registry.lock() {
        Ok(registry) => {
            println!("    Territories:        {}", registry.len());
            for record in registry.list() {
                println!(
                    "      {} '{}' {} ({} points)",
                    record.id,
                    record.name,
                    format_area(record.area),
                    record.path.len()
                );
            }
        }
        Err(e) => eprintln!("  [ERR] Registry unavailable: {}", e),
    }

    if verbose {
        println!("\n{}", journal.display_text());
    }
}

/// Validate each file's full track as one loop
fn run_validate(files: &[PathBuf], config: &TrackingConfig) {
    let mut labels = Vec::new();
    let mut paths = Vec::new();

    for path in files {
        match parse_gpx_file(path) {
            Ok(samples) => {
                labels.push(file_label(path));
                paths.push(samples.into_iter().map(|s| s.point).collect::<Vec<_>>());
            }
            Err(e) => eprintln!("  [ERR] Failed to parse {}: {}", path.display(), e),
        }
    }

    let results = validate_batch(&paths, config);
    for (label, result) in labels.iter().zip(&results) {
        let status = if result.valid { "VALID" } else { "INVALID" };
        println!("  [{}] {}: {}", status, label, result.describe(config));
    }

    let valid = results.iter().filter(|r| r.valid).count();
    println!("\n{} of {} tracks form valid territories", valid, results.len());
}
