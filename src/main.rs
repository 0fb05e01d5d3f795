//! Detection analysis - batch residency and movement analysis for acoustic telemetry
//!
//! Reads a detection table, derives per-station residency, the movement graph
//! between receiver locations and the location table, then writes each table
//! as JSONL into the output directory.
//!
//! Module structure:
//! - `domain/` - Core types (Detection, ColumnMap, output rows)
//! - `io/` - File interfaces (JSONL reader, table egress)
//! - `services/` - Analysis logic (Schema, Residency, Locations, Movement)
//! - `infra/` - Infrastructure (Config)

use anyhow::Context;
use clap::Parser;
use detection_analysis::domain::DurationUnit;
use detection_analysis::infra::Config;
use detection_analysis::io::{read_detection_table, TableEgress};
use detection_analysis::services::run_analysis;
use tracing::{debug, error, info};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Detection analysis - residency and movement tables from telemetry detections
#[derive(Parser, Debug)]
#[command(name = "detection-analysis", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,

    /// Detection table (JSONL), overrides [input] file
    #[arg(short, long)]
    input: Option<String>,

    /// Output directory, overrides [output] dir
    #[arg(short, long)]
    out_dir: Option<String>,

    /// Residency unit: seconds, minutes, hours, days, weeks
    #[arg(short, long)]
    unit: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize structured logging with configurable level via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), git_hash = env!("GIT_HASH"), "detection-analysis starting");

    let mut config = Config::load_from_path(&args.config)?;
    if let Some(unit) = &args.unit {
        let unit: DurationUnit = unit.parse().context("Invalid --unit")?;
        config = config.with_unit(unit);
    }
    if let Some(input) = &args.input {
        config = config.with_input_file(input);
    }
    if let Some(out_dir) = &args.out_dir {
        config = config.with_output_dir(out_dir);
    }

    info!(
        config_file = %config.config_file(),
        study_id = %config.study_id(),
        input_file = %config.input_file(),
        output_dir = %config.output_dir(),
        unit = %config.unit(),
        columns = ?config.columns(),
        "config_loaded"
    );

    let table = read_detection_table(config.input_file())
        .with_context(|| format!("Failed to load detections from {}", config.input_file()))?;

    let output = match run_analysis(&table, config.columns(), config.unit()) {
        Ok(output) => output,
        Err(e) => {
            error!(category = e.category(), error = %e, "analysis_failed");
            return Err(anyhow::Error::new(e).context("Analysis failed"));
        }
    };

    let egress = TableEgress::new(config.output_dir());
    egress.write_residency(&output.residency, config.columns())?;
    egress.write_edges(&output.plottable_edges)?;
    egress.write_locations(&output.locations)?;
    egress.write_moves(&output.moves)?;

    for animal in &output.summary.per_animal {
        debug!(
            animal_id = %animal.animal_id,
            detections = animal.detections,
            days_detected = animal.days_detected,
            locations_visited = animal.locations_visited,
            "animal_summary"
        );
    }

    info!(
        study_id = %config.study_id(),
        detections = output.summary.detections,
        animals = output.summary.animals,
        receivers = output.summary.receivers,
        locations = output.summary.locations,
        first_date = ?output.summary.first_date,
        last_date = ?output.summary.last_date,
        "detection-analysis complete"
    );

    Ok(())
}
