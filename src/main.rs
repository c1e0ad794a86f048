//! CLI entry point for the deceleration/weather analysis tool.
//!
//! Provides subcommands for merging the two source exports into a joined
//! table and for running the per-axis comparison analyses over it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use decel_weather::analyzers::aggregate::aggregate_axis;
use decel_weather::analyzers::category::{SpeedBin, TimeSlot};
use decel_weather::analyzers::types::AxisSummary;
use decel_weather::chart::render_axis_chart;
use decel_weather::join::{DuplicatePolicy, MergedRecord, merge};
use decel_weather::output::{load_merged, print_sample, print_summary, write_merged};
use decel_weather::region::BoundingBox;
use decel_weather::{events, weather};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "decel_weather")]
#[command(about = "Analyze hard-deceleration events against hourly weather", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize both source exports and write the hour-joined table
    Merge {
        /// Raw weather export
        #[arg(long, default_value = "sakai_weather.csv")]
        weather: PathBuf,

        /// Deceleration event export
        #[arg(long, default_value = "sorted_deceleration.csv")]
        events: PathBuf,

        /// Merged table destination
        #[arg(short, long, default_value = "merged_final_data.csv")]
        output: PathBuf,

        /// What to do when two weather rows share the same hour
        #[arg(long, value_enum, default_value = "first")]
        on_duplicate: DuplicatePolicy,
    },
    /// Mean deceleration by speed band and weather, fair-location filtered
    Speed {
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Mean deceleration by time-of-day slot and weather, fair-location filtered
    Time {
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}

#[derive(clap::Args)]
struct AnalysisArgs {
    /// Merged table produced by the merge subcommand
    #[arg(short, long, default_value = "merged_final_data.csv")]
    input: PathBuf,

    /// Chart destination (defaults per axis)
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long, default_value_t = false)]
    no_chart: bool,

    #[command(flatten)]
    bbox: BoundingBox,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/decel_weather.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("decel_weather.log"));

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

    match cli.command {
        Commands::Merge {
            weather,
            events,
            output,
            on_duplicate,
        } => run_merge(&weather, &events, &output, on_duplicate)?,
        Commands::Speed { analysis } => {
            let rows = load_region(&analysis)?;
            let summary = aggregate_axis("speed_bin", &rows, SpeedBin::of_record, &SpeedBin::ORDER);
            report(
                &summary,
                &analysis,
                "mean deceleration by speed band and weather",
                "deceleration_speed_weather.png",
            )?;
        }
        Commands::Time { analysis } => {
            let rows = load_region(&analysis)?;
            let summary = aggregate_axis("time_slot", &rows, TimeSlot::of_record, &TimeSlot::ORDER);
            report(
                &summary,
                &analysis,
                "mean deceleration by time of day and weather",
                "deceleration_timeslot_weather.png",
            )?;
        }
    }

    Ok(())
}

#[tracing::instrument(skip_all, fields(weather = %weather_path.display(), events = %events_path.display()))]
fn run_merge(
    weather_path: &Path,
    events_path: &Path,
    output: &Path,
    on_duplicate: DuplicatePolicy,
) -> Result<()> {
    let weather = weather::load_weather(weather_path)?;
    let events = events::load_events(events_path)?;

    let merged = merge(&events, &weather, on_duplicate)?;
    write_merged(output, &merged)?;
    print_sample(&merged, 5);
    Ok(())
}

/// Loads the merged table and applies the bounding-box filter.
fn load_region(analysis: &AnalysisArgs) -> Result<Vec<MergedRecord>> {
    let rows = load_merged(&analysis.input)?;
    let total = rows.len();
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|r| analysis.bbox.contains(r))
        .collect();
    info!(total, in_region = rows.len(), "region filter applied");
    Ok(rows)
}

fn report(
    summary: &AxisSummary,
    analysis: &AnalysisArgs,
    title: &str,
    default_chart: &str,
) -> Result<()> {
    print_summary(summary)?;
    if !analysis.no_chart {
        let chart_path = analysis
            .chart
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_chart));
        render_axis_chart(summary, title, &chart_path)?;
    }
    Ok(())
}
