//! harvest-gauge CLI: card detection, leaf measurement and maturity rules.

use clap::{Parser, Subcommand, ValueEnum};
use harvest_gauge::{assess_lengths, HarvestConfig, HarvestPipeline, MeasureLeavesInput, WirePoint};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[cfg(not(feature = "tracing"))]
use harvest_gauge::core::init_with_level;
#[cfg(not(feature = "tracing"))]
use log::LevelFilter;

#[cfg(feature = "tracing")]
use harvest_gauge::core::init_tracing;
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "harvest-gauge")]
#[command(about = "Measure leaves against a credit-card reference and classify harvest maturity")]
#[command(version)]
struct Cli {
    /// Pipeline config (JSON). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Emit JSON log lines (tracing builds only).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the reference card in an image.
    Detect {
        /// JPEG or PNG image.
        image: PathBuf,
        /// Optional crop quad as JSON, e.g. `[{"x":0,"y":0},...]`.
        #[arg(long)]
        crop: Option<String>,
    },

    /// Measure leaves described by a JSON request file.
    Measure {
        /// `{"image_path": .., "card_corners": [..], "leaves": [{"points": [..]}], "crop": [..]}`.
        request: PathBuf,
    },

    /// Assess leaf lengths already known in centimeters.
    Assess {
        #[arg(required = true, num_args = 1..)]
        lengths_cm: Vec<f64>,
    },

    /// Print the maturity thresholds and rules.
    Rules,

    /// Write the perspective-corrected view of a quad as PNG.
    Rectify {
        image: PathBuf,
        /// Quad as JSON, four `{"x","y"}` points in any order.
        #[arg(long)]
        quad: String,
        #[arg(long)]
        out: PathBuf,
    },

    /// Write the default config as pretty JSON.
    DefaultConfig { out: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[cfg(not(feature = "tracing"))]
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MeasureRequestFile {
    image_path: PathBuf,
    #[serde(flatten)]
    input: MeasureLeavesInput,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    #[cfg(not(feature = "tracing"))]
    {
        let _ = cli.json_logs;
        init_with_level(cli.log_level.into())?;
    }

    #[cfg(feature = "tracing")]
    {
        let _ = cli.log_level;
        let _ = LogTracer::init();
        init_tracing(cli.json_logs);
    }

    let config = match &cli.config {
        Some(path) => HarvestConfig::load_json(path)?,
        None => HarvestConfig::default(),
    };

    match cli.command {
        Commands::Detect { image, crop } => run_detect(config, &image, crop.as_deref()),
        Commands::Measure { request } => run_measure(config, &request),
        Commands::Assess { lengths_cm } => run_assess(&config, &lengths_cm),
        Commands::Rules => print_json(&HarvestPipeline::new(config)?.rules()),
        Commands::Rectify { image, quad, out } => run_rectify(config, &image, &quad, &out),
        Commands::DefaultConfig { out } => {
            HarvestConfig::default().write_json(&out)?;
            info!("default config written to {}", out.display());
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_points(raw: &str) -> CliResult<Vec<WirePoint>> {
    Ok(serde_json::from_str(raw)?)
}

fn run_detect(config: HarvestConfig, image: &Path, crop: Option<&str>) -> CliResult<()> {
    let pipeline = HarvestPipeline::new(config)?;
    let bytes = fs::read(image)?;
    let crop = crop.map(parse_points).transpose()?;
    let response = pipeline.detect_card(&bytes, crop.as_deref())?;
    print_json(&response)
}

fn run_measure(config: HarvestConfig, request: &Path) -> CliResult<()> {
    let pipeline = HarvestPipeline::new(config)?;
    let req: MeasureRequestFile = serde_json::from_str(&fs::read_to_string(request)?)?;
    let bytes = fs::read(&req.image_path)?;
    let response = pipeline.measure_leaves(&bytes, &req.input)?;
    print_json(&response)
}

fn run_assess(config: &HarvestConfig, lengths_cm: &[f64]) -> CliResult<()> {
    config.validate()?;
    let assessment = assess_lengths(lengths_cm, &config.measurement)?;
    print_json(&assessment)
}

fn run_rectify(config: HarvestConfig, image_path: &Path, quad: &str, out: &Path) -> CliResult<()> {
    let pipeline = HarvestPipeline::new(config)?;
    let bytes = fs::read(image_path)?;
    let img = pipeline.decode(&bytes)?;
    let crop = parse_points(quad)?;
    let rectified = pipeline.prepare_frame(img, Some(&crop))?;
    rectified.save_with_format(out, image::ImageFormat::Png)?;
    info!(
        "rectified {}x{} written to {}",
        rectified.width(),
        rectified.height(),
        out.display()
    );
    Ok(())
}
