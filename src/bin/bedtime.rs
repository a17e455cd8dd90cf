//! Bedtime CLI - Command-line front end for BetterRest
//!
//! Commands:
//! - estimate: Estimate the ideal bedtime for one set of inputs
//! - inspect: Print the validated model artifact
//! - doctor: Diagnose model artifact health

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use betterrest::model::{ModelArtifact, ModelSource, SharedModel};
use betterrest::{
    estimate_bedtime, Bedtime, BedtimeAlert, CoffeeIntake, EstimateError, SleepAmount, WakeTime,
    BETTERREST_VERSION, PRODUCER_NAME,
};

/// Bedtime - Estimate your ideal bedtime
#[derive(Parser)]
#[command(name = "bedtime")]
#[command(version = BETTERREST_VERSION)]
#[command(about = "Estimate the ideal bedtime from wake time, sleep and coffee", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the ideal bedtime
    Estimate {
        /// Desired wake-up time (HH:MM)
        #[arg(long, default_value = "07:00")]
        wake: String,

        /// Desired amount of sleep in hours (4-12, quarter-hour steps)
        #[arg(long, default_value = "8.0")]
        sleep: f64,

        /// Daily coffee intake in cups (0-20)
        #[arg(long, default_value = "1")]
        coffee: u32,

        /// Model artifact path (defaults to the embedded model)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the validated model artifact
    Inspect {
        /// Model artifact path (defaults to the embedded model)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose model artifact health
    Doctor {
        /// Model artifact path (defaults to the embedded model)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Alert title and message
    Text,
    /// JSON result record
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), BedtimeCliError> {
    match cli.command {
        Commands::Estimate {
            wake,
            sleep,
            coffee,
            model,
            format,
        } => cmd_estimate(&wake, sleep, coffee, model.as_deref(), format),

        Commands::Inspect { model, json } => cmd_inspect(model.as_deref(), json),

        Commands::Doctor { model, json } => cmd_doctor(model.as_deref(), json),
    }
}

fn shared_model(path: Option<&Path>) -> SharedModel {
    match path {
        Some(path) => SharedModel::from_path(path),
        None => SharedModel::embedded(),
    }
}

fn cmd_estimate(
    wake: &str,
    sleep: f64,
    coffee: u32,
    model_path: Option<&Path>,
    format: OutputFormat,
) -> Result<(), BedtimeCliError> {
    let wake: WakeTime = wake.parse().map_err(BedtimeCliError::Input)?;
    let sleep = SleepAmount::new(sleep).map_err(BedtimeCliError::Input)?;
    let coffee = CoffeeIntake::new(coffee).map_err(BedtimeCliError::Input)?;

    let model = shared_model(model_path);
    let result = estimate_bedtime(&model, wake.seconds_of_day(), sleep.hours(), coffee.cups());
    if let Err(e) = &result {
        tracing::warn!(error = %e, "bedtime estimation failed");
    }

    let alert = BedtimeAlert::from_result(&result);

    match format {
        OutputFormat::Text => println!("{alert}"),
        OutputFormat::Json => {
            let record = EstimateRecord {
                wake,
                sleep_hours: sleep.hours(),
                coffee_cups: coffee.cups(),
                bedtime: result.as_ref().ok().copied(),
                alert: alert.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    if alert.success {
        Ok(())
    } else {
        Err(BedtimeCliError::EstimationFailed)
    }
}

fn cmd_inspect(model_path: Option<&Path>, json: bool) -> Result<(), BedtimeCliError> {
    let shared = shared_model(model_path);
    let artifact: &ModelArtifact = shared.get().map_err(BedtimeCliError::Model)?.artifact();

    if json {
        println!("{}", serde_json::to_string_pretty(artifact)?);
    } else {
        println!("Model: {}", artifact.name);
        println!("Format: {}", artifact.format_version);
        println!("Kind: {}", artifact.kind);
        println!("Inputs: {}", artifact.inputs.join(", "));
        println!(
            "Output: {} ({})",
            artifact.output.name,
            artifact.output.unit.as_str()
        );
        println!("Intercept: {}", artifact.intercept);
        for name in &artifact.inputs {
            if let Some(weight) = artifact.coefficients.get(name) {
                println!("  {name}: {weight}");
            }
        }
    }

    Ok(())
}

fn cmd_doctor(model_path: Option<&Path>, json: bool) -> Result<(), BedtimeCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("BetterRest version {BETTERREST_VERSION}"),
    });

    let shared = shared_model(model_path);
    let source = match shared.source() {
        ModelSource::Embedded => "embedded artifact".to_string(),
        ModelSource::Path(path) => path.display().to_string(),
        ModelSource::Json(_) => "inline JSON".to_string(),
    };
    match shared.get() {
        Ok(model) => {
            checks.push(DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Loaded '{}' from {source} (output in {})",
                    model.artifact().name,
                    model.output_unit().as_str()
                ),
            });

            checks.push(smoke_check(&shared));
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot load model from {source}: {e}"),
            });
        }
    }

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: BETTERREST_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Bedtime Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(BedtimeCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Run the reference scenario (07:00, 8 hours, 1 cup) through the model
fn smoke_check(model: &SharedModel) -> DoctorCheck {
    match estimate_bedtime(model, 25_200, 8.0, 1) {
        Ok(bedtime) if bedtime.predicted_sleep_seconds() > 0.0 => DoctorCheck {
            name: "smoke_prediction".to_string(),
            status: CheckStatus::Ok,
            message: format!("07:00, 8 hours, 1 cup -> bedtime {bedtime}"),
        },
        Ok(bedtime) => DoctorCheck {
            name: "smoke_prediction".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Predicted sleep is {}s; bedtime {bedtime} falls after wake-up",
                bedtime.predicted_sleep_seconds()
            ),
        },
        Err(e) => DoctorCheck {
            name: "smoke_prediction".to_string(),
            status: CheckStatus::Error,
            message: format!("Prediction failed: {e}"),
        },
    }
}

// Error types

#[derive(Debug)]
enum BedtimeCliError {
    Input(EstimateError),
    Model(EstimateError),
    Json(serde_json::Error),
    EstimationFailed,
    DoctorFailed,
}

impl From<serde_json::Error> for BedtimeCliError {
    fn from(e: serde_json::Error) -> Self {
        BedtimeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BedtimeCliError> for CliError {
    fn from(e: BedtimeCliError) -> Self {
        match e {
            BedtimeCliError::Input(e) => CliError {
                code: "INVALID_INPUT".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Use --wake HH:MM, --sleep 4-12 in 0.25 steps, --coffee 0-20".to_string(),
                ),
            },
            BedtimeCliError::Model(e) => CliError {
                code: "MODEL_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'bedtime doctor --model <path>' for details".to_string()),
            },
            BedtimeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            BedtimeCliError::EstimationFailed => CliError {
                code: "ESTIMATION_FAILED".to_string(),
                message: "The bedtime could not be calculated".to_string(),
                hint: Some("Run with --verbose to see the cause".to_string()),
            },
            BedtimeCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct EstimateRecord {
    wake: WakeTime,
    sleep_hours: f64,
    coffee_cups: u32,
    bedtime: Option<Bedtime>,
    alert: BedtimeAlert,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
