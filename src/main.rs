//! CLI entry point for the fuel rater.
//!
//! Provides subcommands for generating a synthetic week of Route 12 trips,
//! running a trip file through the analysis pipeline, and printing the
//! load × acceleration fuel matrix.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fuel_rater::analyzers::aggregate::{aggregate_fleet, driver_reports};
use fuel_rater::analyzers::analyzer::process_batch;
use fuel_rater::analyzers::fuel::impact_matrix;
use fuel_rater::analyzers::scenarios::select_scenarios;
use fuel_rater::config::Config;
use fuel_rater::simulator::{generate_week, summarize};
use fuel_rater::{
    output::{append_record, print_json, write_json},
    parser::parse_trips,
    stats::TripStats,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fuel_rater")]
#[command(about = "Estimates bus fuel waste from passenger load and acceleration", long_about = None)]
struct Cli {
    /// JSON config file overriding the default constants
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic week of Route 12 trips
    Simulate {
        /// Seed for the random generator
        #[arg(short, long, default_value_t = 42)]
        seed: u64,

        /// File to write the trip array to
        #[arg(short, long, default_value = "output/route_12_trips.json")]
        output: String,
    },
    /// Run a JSON trip file through the analysis pipeline
    Process {
        /// JSON array of trips
        #[arg(value_name = "INPUT")]
        input: String,

        /// Directory for the JSON outputs
        #[arg(short = 'd', long, default_value = "output")]
        output_dir: String,

        /// Optional: CSV file to append one summary row per trip to
        #[arg(long)]
        csv: Option<String>,

        /// Optional: Gzip compress the JSON outputs
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Print the load × acceleration fuel matrix
    Matrix,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fuel_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fuel_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Simulate { seed, output } => simulate(seed, &output, &config)?,
        Commands::Process {
            input,
            output_dir,
            csv,
            gzip,
        } => process(&input, &output_dir, csv.as_deref(), gzip, &config)?,
        Commands::Matrix => {
            let matrix = impact_matrix(&config);
            for (load, row) in &matrix {
                for (accel, cell) in row {
                    info!(
                        load = %load,
                        accel = %accel,
                        fuel_per_km = cell.fuel_per_km,
                        penalty_pct = cell.penalty_percentage,
                        "Fuel rate"
                    );
                }
            }
            print_json(&matrix)?;
        }
    }

    Ok(())
}

/// `--config` wins over `FUEL_RATER_CONFIG`; with neither, the defaults apply.
fn load_config(flag: Option<String>) -> Result<Config> {
    match flag.or_else(|| std::env::var("FUEL_RATER_CONFIG").ok()) {
        Some(path) => {
            info!(path = %path, "Loading config");
            Config::load(&path)
        }
        None => Ok(Config::default()),
    }
}

/// Writes a generated week of trips plus a headline summary next to it.
#[tracing::instrument(skip(config))]
fn simulate(seed: u64, output: &str, config: &Config) -> Result<()> {
    let output = Path::new(output);
    if let Some(dir) = output.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let trips = generate_week(seed);
    let summary = summarize(&trips, config);
    info!(
        total = summary.total_trips,
        peak = summary.peak_trips,
        light = summary.light_load_trips,
        medium = summary.medium_load_trips,
        heavy = summary.heavy_load_trips,
        "Generated trips"
    );

    write_json(output, &trips, false)?;
    write_json(&output.with_file_name("data_summary.json"), &summary, false)?;

    info!(path = %output.display(), "Trip data written");
    Ok(())
}

/// Runs every trip in `input` through the pipeline and writes the dashboard
/// files to `output_dir`.
#[tracing::instrument(skip(config))]
fn process(
    input: &str,
    output_dir: &str,
    csv: Option<&str>,
    gzip: bool,
    config: &Config,
) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("failed to read '{input}'"))?;
    let records = parse_trips(&bytes)?;
    info!(records = records.len(), "Loaded trip records");

    let outcome = process_batch(records, config);
    for failure in &outcome.failures {
        warn!(
            trip_id = %failure.trip_id,
            error_type = %failure.error_type,
            reason = %failure.reason,
            "Trip skipped"
        );
    }

    let fleet = aggregate_fleet(&outcome.processed, config);
    for (category, stats) in &fleet.by_load_category {
        info!(
            category = %category,
            count = stats.count,
            percentage = stats.percentage,
            avg_fuel_per_km = stats.avg_fuel_per_km,
            "Load category"
        );
    }
    info!(
        weekly_fuel_waste = fleet.fleet_savings.weekly_fuel_waste,
        weekly_cost_waste = fleet.fleet_savings.weekly_cost_waste,
        annual_cost_waste = fleet.fleet_savings.annual_cost_waste,
        fleet_projection = fleet.sbs_fleet_projection.projected_annual_cost_waste,
        "Savings opportunity"
    );

    let drivers = driver_reports(&outcome.processed, config);
    let scenarios = select_scenarios(&outcome.processed, config)?;

    let dir = Path::new(output_dir);
    std::fs::create_dir_all(dir)?;
    write_json(&dir.join("fleet_weekly_stats.json"), &fleet, gzip)?;
    write_json(&dir.join("all_trips_processed.json"), &outcome.processed, gzip)?;
    write_json(&dir.join("driver_reports.json"), &drivers, gzip)?;
    if !outcome.failures.is_empty() {
        write_json(&dir.join("failed_trips.json"), &outcome.failures, gzip)?;
    }
    for (name, trip) in scenarios.files() {
        info!(scenario = name, trip_id = %trip.trip_id, "Demo scenario");
        write_json(&dir.join(name), trip, gzip)?;
    }

    if let Some(csv_path) = csv {
        for analysis in &outcome.processed {
            append_record(csv_path, &TripStats::from_analysis(analysis))?;
        }
        for failure in &outcome.failures {
            append_record(csv_path, &TripStats::from_error(failure))?;
        }
        info!(path = csv_path, "CSV summary appended");
    }

    info!(
        processed = outcome.processed.len(),
        failed = outcome.failures.len(),
        output_dir,
        "Finished processing trips"
    );
    Ok(())
}
