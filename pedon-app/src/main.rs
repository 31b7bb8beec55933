use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod config;
mod diffgram;
mod fetch;
mod plotting;
mod render;
mod workflow;

/// Retrieves USDA soil survey horizons for the configured coordinates and
/// reports depth-binned, length-weighted property averages.
#[derive(Parser, Debug)]
#[command(name = "pedon")]
#[command(about = "Depth-binned soil survey reporting from USDA Soil Data Access")]
struct Args {
    /// Path to the survey request YAML
    #[arg(long, default_value = "pedon-app/survey.yaml")]
    request: PathBuf,

    /// Directory that receives one timestamped subdirectory per run
    #[arg(long, default_value = "data/runs")]
    output_root: PathBuf,

    /// Also write the report as JSON
    #[arg(long)]
    json: bool,

    /// Draw a texture depth-profile chart per coordinate
    #[arg(long)]
    plot: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("--- Pedon Soil Survey ---");

    let request = config::SurveyRequest::load(&args.request)?;
    let grid = request.grid();

    let output_dir = args.output_root.join(format!(
        "survey_{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    // Copy the request file to the output directory for traceability
    fs::copy(&args.request, output_dir.join("survey.yaml"))?;

    let client = fetch::SdaClient::new()?;
    let report = workflow::run_survey(&client, &request.coordinates, &grid)?;

    println!("\nFinal Priority Soil Composition by Depth Range for All Coordinates:");
    render::print_table(&report);

    let csv_path = output_dir.join("soil_profile.csv");
    pedon_core::export::write_csv(&csv_path, &report)?;

    if args.json {
        let json_path = output_dir.join("soil_profile.json");
        let file = fs::File::create(&json_path)
            .with_context(|| format!("Failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, &report).context("Failed to serialize JSON report")?;
    }

    if args.plot {
        for &coordinate in &request.coordinates {
            plotting::plot_texture_profile(&output_dir, coordinate, &report)?;
        }
    }

    println!("\nSurvey complete. Results are in '{}'", output_dir.display());

    Ok(())
}
