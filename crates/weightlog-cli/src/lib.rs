// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Operator tooling for the weight tracker database.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode as ProcessExitCode;

use clap::{error::ErrorKind, ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use weightlog_api::{export_csv, trend_response};
use weightlog_core::{ExitCode, MachineError, ResultExt};
use weightlog_model::{Email, ExportRow};
use weightlog_store::{AccountStore, MeasurementStore, SqliteStore, Store};
use weightlog_trend::{compute_trends_with, Sample, WeekScheme};

pub const CRATE_NAME: &str = "weightlog-cli";

#[derive(Parser)]
#[command(name = "weightlog")]
#[command(about = "Weight tracker operations CLI")]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema.
    Migrate {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print one user's measurements, oldest first.
    Export {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = FormatCli::Json)]
        format: FormatCli,
    },
    /// Compute trends from an export JSON file.
    Trends {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = WeekSchemeCli::Iso)]
        week_scheme: WeekSchemeCli,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatCli {
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WeekSchemeCli {
    Iso,
    Legacy,
}

impl From<WeekSchemeCli> for WeekScheme {
    fn from(value: WeekSchemeCli) -> Self {
        match value {
            WeekSchemeCli::Iso => Self::Iso,
            WeekSchemeCli::Legacy => Self::Legacy,
        }
    }
}

#[derive(Debug)]
struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    fn validation(code: &str, message: &str) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            machine: MachineError::new(code, message),
        }
    }

    fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.machine = self.machine.with_detail(key, value);
        self
    }

    fn dependency(message: String) -> Self {
        Self {
            exit_code: ExitCode::DependencyFailure,
            machine: MachineError::new("dependency_failure", &message),
        }
    }

    fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError {
                    exit_code: ExitCode::Usage,
                    machine: MachineError::new("usage_error", "invalid command line arguments")
                        .with_detail("error", &err.to_string()),
                });
            }
        },
    };
    init_logging(cli.verbose);

    match cli.command {
        Commands::Migrate { db } => migrate(&resolve_db(db), cli.json),
        Commands::Export { db, email, format } => export(&resolve_db(db), &email, format),
        Commands::Trends { input, week_scheme } => trends(&input, week_scheme.into()),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("logging disabled: {err}");
    }
}

fn resolve_db(db: Option<PathBuf>) -> PathBuf {
    db.unwrap_or_else(weightlog_core::default_database_path)
}

fn open_store(path: &Path) -> Result<SqliteStore, CliError> {
    SqliteStore::open(path)
        .with_context("open database")
        .map_err(|e| CliError::dependency(e.to_string()).with_detail("db", &path.display().to_string()))
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn migrate(db: &Path, machine_json: bool) -> Result<(), CliError> {
    let store = open_store(db)?;
    let version = store
        .schema_version()
        .map_err(|e| CliError::dependency(e.to_string()))?;
    info!(db = %db.display(), schema_version = version, "database migrated");
    if machine_json {
        print_json(&json!({"database": db.display().to_string(), "schema_version": version}))
    } else {
        println!("migrated {} to schema version {version}", db.display());
        Ok(())
    }
}

fn export(db: &Path, email: &str, format: FormatCli) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::validation("invalid_email", &e.to_string()))?;
    let store = open_store(db)?;
    let user = store
        .user_by_email(&email)
        .map_err(|e| CliError::dependency(e.to_string()))?
        .ok_or_else(|| {
            CliError::validation("user_not_found", "no account with that email")
                .with_detail("email", email.as_str())
        })?;
    let rows: Vec<ExportRow> = store
        .measurements_ascending(user.id, None)
        .map_err(|e| CliError::dependency(e.to_string()))?
        .iter()
        .map(ExportRow::from_measurement)
        .collect();
    info!(user_id = %user.id, rows = rows.len(), format = ?format, "measurements exported");
    match format {
        FormatCli::Json => print_json(&rows),
        FormatCli::Csv => {
            print!("{}", export_csv(&rows));
            Ok(())
        }
    }
}

/// Rows may arrive in any order; samples are sorted before bucketing.
fn load_samples(input: &Path) -> Result<Vec<Sample>, CliError> {
    let raw = fs::read_to_string(input)
        .with_context("read export file")
        .map_err(|e| {
            CliError::dependency(e.to_string()).with_detail("input", &input.display().to_string())
        })?;
    let rows: Vec<ExportRow> = serde_json::from_str(&raw)
        .map_err(|e| CliError::validation("invalid_export", &e.to_string()))?;
    let mut samples = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            row.sample().map_err(|e| {
                CliError::validation("invalid_export", &e.to_string())
                    .with_detail("row", &index.to_string())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    samples.sort_by_key(|s| s.taken_at);
    debug!(input = %input.display(), samples = samples.len(), "loaded export rows");
    Ok(samples)
}

fn trends(input: &Path, scheme: WeekScheme) -> Result<(), CliError> {
    let samples = load_samples(input)?;
    print_json(&trend_response(&compute_trends_with(&samples, scheme)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_sorted_and_validated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rows.json");
        fs::write(
            &path,
            r#"[{"date":"2024-02-01T00:00:00.000Z","weightKg":70.0,"note":""},
                {"date":"2024-01-01T00:00:00.000Z","weightKg":72.0}]"#,
        )
        .expect("write");
        let samples = load_samples(&path).expect("samples");
        assert_eq!(samples[0].weight_kg, 72.0);
        assert_eq!(samples[1].weight_kg, 70.0);

        fs::write(&path, r#"[{"date":"yesterday","weightKg":70.0}]"#).expect("write");
        let err = load_samples(&path).expect_err("bad date");
        assert_eq!(err.exit_code, ExitCode::Validation);
        assert_eq!(err.machine.details.get("row").map(String::as_str), Some("0"));
    }

    #[test]
    fn repeated_logging_init_is_tolerated() {
        init_logging(0);
        init_logging(2);
    }
}
