use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use ocr_layout::{
    BatchReport, HeaderPolicy, ImageInput, LayoutOptions, Orchestrator, RecognitionMode,
    RecordedEngine,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "ocr2tsv",
    version,
    about = "Rebuild text or tab-separated tables from recorded OCR output"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Format recorded recogniser output, one file per image.
    Format(FormatArgs),
}

#[derive(Debug, Args)]
struct FormatArgs {
    /// Recorded recogniser JSON output. Repeatable; processed in order.
    #[arg(short, long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Output path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a JSON report with per-image outcomes and warnings.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Layout mode: auto, text or table.
    #[arg(long, default_value = "auto")]
    mode: String,

    /// Header row policy for tables: cjk, first-line or never.
    #[arg(long, default_value = "cjk")]
    header_policy: String,

    /// Skip the quick language-detection pass.
    #[arg(long)]
    no_language_detection: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &FormatArgs) -> Result<LayoutOptions> {
    let mode = RecognitionMode::from_str(&args.mode)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --mode")?;
    let header_policy = HeaderPolicy::from_str(&args.header_policy)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --header-policy")?;

    Ok(LayoutOptions {
        mode,
        header_policy,
        detect_language: !args.no_language_detection,
        ..LayoutOptions::default()
    })
}

fn read_inputs(paths: &[PathBuf]) -> Result<Vec<ImageInput>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
            Ok(ImageInput::new(name, bytes))
        })
        .collect()
}

fn log_report(report: &BatchReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} image={:?} engine={:?}: {}",
                warning.code, warning.image_index, warning.engine, warning.message
            );
        }
    }
}

async fn run_format(args: &FormatArgs) -> Result<BatchReport> {
    let options = parse_options(args)?;
    let images = read_inputs(&args.inputs)?;

    let mut orchestrator = Orchestrator::new(options)?.with_engine(Arc::new(RecordedEngine));
    let mut progress = |percent: f32, message: &str| {
        tracing::debug!(percent, step = message, "progress");
    };
    let report = orchestrator.run_batch(&images, &mut progress).await?;

    let text = report.combined_text();
    match &args.output {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => println!("{text}"),
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }

    Ok(report)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ocr_layout=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Format(args) => match run_format(&args).await {
            Ok(report) => {
                log_report(&report, args.verbose);
                if report.failed_count() < report.images.len() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
