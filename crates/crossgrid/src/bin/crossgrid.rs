//! crossgrid CLI: detect crossword grids in images.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use crossgrid::detect;
use crossgrid::{DetectionResult, DetectorParams, DisplaySize, GridDetector};
use serde::Serialize;

#[cfg(not(feature = "tracing"))]
use log::info;
#[cfg(feature = "tracing")]
use tracing::info;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "crossgrid")]
#[command(about = "Detect crossword grids in PNG/JPEG images and report an overlay calibration")]
#[command(version)]
struct Cli {
    /// Log level: off, error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the grid and print a JSON report.
    Detect(DetectArgs),

    /// Check that an image is an accepted format and size.
    Validate {
        /// Path to the input image.
        image: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Path to the input image.
    image: PathBuf,

    /// Width of the image as displayed; defaults to the image width.
    #[arg(long, requires = "display_height")]
    display_width: Option<f32>,

    /// Height of the image as displayed; defaults to the image height.
    #[arg(long, requires = "display_width")]
    display_height: Option<f32>,

    /// JSON file with detector parameters; missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DetectReport {
    image_path: String,
    image_width: Option<u32>,
    image_height: Option<u32>,
    display: Option<DisplaySize>,
    #[serde(flatten)]
    result: DetectionResult,
}

#[derive(Debug, Serialize)]
struct ValidateReport {
    image_path: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Validate { image } => run_validate(&image),
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) -> CliResult<()> {
    crossgrid::core::init_with_level(crossgrid::core::parse_level(&cli.log_level))?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) -> CliResult<()> {
    // RUST_LOG wins over --log-level
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &cli.log_level);
    }
    let _ = tracing_log::LogTracer::init();
    crossgrid::core::init_tracing(false);
    Ok(())
}

fn load_params(path: Option<&Path>) -> CliResult<DetectorParams> {
    let Some(path) = path else {
        return Ok(DetectorParams::default());
    };
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
    let params = serde_json::from_str(&raw)
        .map_err(|e| format!("failed to parse config {}: {e}", path.display()))?;
    Ok(params)
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(args)))]
fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let params = load_params(args.config.as_deref())?;
    let detector = GridDetector::new(params);

    let explicit = match (args.display_width, args.display_height) {
        (Some(w), Some(h)) => Some(DisplaySize::new(w, h)),
        _ => None,
    };

    let (report, dims) = match detect::load_image(&args.image) {
        Ok((img, _)) => {
            let display = explicit
                .unwrap_or_else(|| DisplaySize::new(img.width() as f32, img.height() as f32));
            let result: DetectionResult =
                detect::detect_grid_with(&img, Some(display), &detector).into();
            (result, Some((img.width(), img.height(), display)))
        }
        Err(crossgrid::DetectError::Io(err)) => {
            return Err(format!("failed to open {}: {err}", args.image.display()).into());
        }
        Err(err) => (DetectionResult::from(Err(err)), None),
    };

    match &report {
        DetectionResult::Success { calibration } => info!(
            "detected {}x{} grid, cell {}x{} at ({}, {})",
            calibration.grid_width,
            calibration.grid_height,
            calibration.cell_width,
            calibration.cell_height,
            calibration.offset_x,
            calibration.offset_y
        ),
        DetectionResult::Failure { error } => info!("detection failed: {error}"),
    }

    let report = DetectReport {
        image_path: args.image.display().to_string(),
        image_width: dims.map(|d| d.0),
        image_height: dims.map(|d| d.1),
        display: dims.map(|d| d.2).or(explicit),
        result: report,
    };
    write_json(&report, args.output.as_deref())
}

fn run_validate(image: &Path) -> CliResult<()> {
    let report = match detect::load_image(image) {
        Ok((img, format)) => ValidateReport {
            image_path: image.display().to_string(),
            valid: true,
            format: Some(format!("{format:?}")),
            width: Some(img.width()),
            height: Some(img.height()),
            error: None,
        },
        Err(err) => ValidateReport {
            image_path: image.display().to_string(),
            valid: false,
            format: None,
            width: None,
            height: None,
            error: Some(err.to_string()),
        },
    };
    write_json(&report, None)?;
    if report.valid {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, json)?;
            info!("wrote report to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
