//! Zentinel Activity Classifier CLI
//!
//! Classifies a single activity record, or whole CSV / JSON Lines files.
//! Results go to stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use zentinel_activity_classifier::{
    ActivityClassifier, BatchFormat, BatchReport, BatchSummary, ClassificationOutcome,
    ClassifierConfig,
};

/// Version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

const NO_INPUT_MESSAGE: &str =
    "Error: No input provided—please pass a single activity row or object.";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "zentinel-classify", version)]
#[command(about = "Rule-based classifier for network and application activity records")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON file with extra patterns and agents
    #[arg(long, global = true, env = "CLASSIFIER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, env = "CLASSIFIER_VERBOSE")]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "CLASSIFIER_LOG_JSON")]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify one record given as a flat row or a JSON object
    Classify {
        /// The activity record
        input: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    /// Classify every record of one or more files
    Batch {
        /// CSV or JSON Lines files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// First CSV line is a header
        #[arg(long)]
        header: bool,

        /// Override the format inferred from each file extension
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,

        /// Worker threads (0 = available parallelism)
        #[arg(long, env = "CLASSIFIER_BATCH_WORKERS")]
        workers: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Jsonl,
}

impl FormatArg {
    fn to_batch_format(self, has_header: bool) -> BatchFormat {
        match self {
            FormatArg::Csv => BatchFormat::Csv { has_header },
            FormatArg::Jsonl => BatchFormat::JsonLines,
        }
    }
}

/// JSON document printed by `batch --output json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchOutput {
    reports: Vec<BatchReport>,
    failures: Vec<BatchFailure>,
    summary: BatchSummary,
}

#[derive(Debug, Serialize)]
struct BatchFailure {
    source: String,
    error: String,
}

/// Install panic hook for production diagnostics
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("Unknown panic payload");

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        error!(
            panic_payload = %payload,
            panic_location = %location,
            "Classifier panicked"
        );

        default_hook(panic_info);
    }));
}

fn init_tracing(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(format!(
            "{}={},zentinel_activity_classifier={}",
            env!("CARGO_CRATE_NAME"),
            log_level,
            log_level
        ))
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &Args) -> Result<ClassifierConfig> {
    match &args.config {
        Some(path) => {
            let config = ClassifierConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            info!(path = %path.display(), "Configuration loaded");
            Ok(config)
        }
        None => Ok(ClassifierConfig::default()),
    }
}

fn run_classify(
    classifier: &ActivityClassifier,
    input: Option<&str>,
    output: OutputFormat,
) -> Result<ExitCode> {
    let Some(input) = input.filter(|s| !s.trim().is_empty()) else {
        println!("{}", NO_INPUT_MESSAGE);
        return Ok(ExitCode::FAILURE);
    };

    let outcome = classifier.classify_activity(input);
    print_outcome(&outcome, output)?;

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_outcome(outcome: &ClassificationOutcome, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Text => println!("{}", outcome.text),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
    }
    Ok(())
}

fn run_batch(
    classifier: &ActivityClassifier,
    files: &[PathBuf],
    header: bool,
    format: Option<FormatArg>,
    output: OutputFormat,
) -> Result<ExitCode> {
    let mut summary = BatchSummary::default();
    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for path in files {
        let batch_format = match format {
            Some(format) => format.to_batch_format(header),
            None => BatchFormat::infer(path, header),
        };

        match classifier.classify_file(path, batch_format) {
            Ok(report) => {
                if output == OutputFormat::Text {
                    for entry in &report.results {
                        println!("{}", entry.outcome.text);
                        println!();
                    }
                }
                summary.add_report(&report);
                reports.push(report);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Batch file failed");
                if output == OutputFormat::Text {
                    println!("Error: {}", e);
                    println!();
                }
                summary.add_failure();
                failures.push(BatchFailure {
                    source: path.display().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        files = summary.files_processed,
        failed = summary.files_failed,
        total = summary.total_count,
        malicious = summary.malicious_count,
        errors = summary.error_count,
        "Batch run complete"
    );

    if output == OutputFormat::Json {
        let document = BatchOutput {
            reports,
            failures,
            summary: summary.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    Ok(if summary.files_failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> Result<ExitCode> {
    install_panic_hook();

    let args = Args::parse();
    init_tracing(args.verbose, args.log_json);

    info!(version = VERSION, "Starting Zentinel activity classifier");

    let mut config = load_config(&args)?;
    if let Command::Batch {
        workers: Some(workers),
        ..
    } = &args.command
    {
        config.batch_workers = *workers;
    }

    let classifier = ActivityClassifier::new(config).map_err(|e| {
        error!(error = %e, "Failed to initialize classifier");
        e
    })?;

    match &args.command {
        Command::Classify { input, output } => run_classify(&classifier, input.as_deref(), *output),
        Command::Batch {
            files,
            header,
            format,
            output,
            ..
        } => run_batch(&classifier, files, *header, *format, *output),
    }
}
