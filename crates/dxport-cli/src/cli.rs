//! `dxport`: move data between files and SQLite tables
//!
//! ```text
//! dxport --database app.db import --file people.csv --table people
//! dxport --database app.db export --file people.xlsx --table people
//! dxport --database app.db import --job nightly.toml --truncate
//! ```

mod logging;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use dxport_interchange::{
    FieldDelimiter, FileFormat, JobParameters, JobRunner, JobStatus, JobSummary, TextEncoding,
};
use dxport_sqlite::SqliteDatabase;

use crate::output::{OutputFormatKind, format_summary};

/// Exit code for a job stopped by Ctrl-C
const EXIT_CANCELLED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "dxport", version, about = "Import and export table data as files")]
struct Cli {
    /// SQLite database file
    #[arg(long, short = 'd', env = "DXPORT_DATABASE", global = true)]
    database: Option<PathBuf>,

    /// Also write JSON logs to the dxport log directory
    #[arg(long, global = true)]
    log_json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a file into a table
    Import(JobArgs),
    /// Write a table out to a file
    Export(JobArgs),
    /// List supported file formats
    Formats,
}

/// Job options; each flag overrides the matching job-file value
#[derive(Debug, Args)]
struct JobArgs {
    /// TOML or JSON file holding job parameters
    #[arg(long)]
    job: Option<PathBuf>,

    /// File to read (import) or write (export)
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// csv, spreadsheet, json, xml or sql; inferred from the file extension when omitted
    #[arg(long)]
    format: Option<FileFormat>,

    /// Target schema
    #[arg(long, short = 's')]
    schema: Option<String>,

    /// Target table
    #[arg(long, short = 't')]
    table: Option<String>,

    /// The file has no header row (CSV only)
    #[arg(long)]
    no_headers: bool,

    /// utf-8, utf-16le, utf-16be, ascii or a Windows code page like cp1252
    #[arg(long)]
    encoding: Option<TextEncoding>,

    /// comma, semicolon, tab or pipe
    #[arg(long)]
    delimiter: Option<FieldDelimiter>,

    /// Rows per bulk-write batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Seconds allowed for one batch
    #[arg(long)]
    timeout: Option<u64>,

    /// Delete existing rows before importing
    #[arg(long)]
    truncate: bool,

    /// Keep going past rows with unresolvable values
    #[arg(long)]
    skip_row_errors: bool,

    /// Check every row before writing anything
    #[arg(long)]
    validate: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl JobArgs {
    /// Merge the job file (if any) with the command-line overrides
    fn into_parameters(self) -> anyhow::Result<JobParameters> {
        let mut params = match &self.job {
            Some(path) => JobParameters::from_file(path)
                .with_context(|| format!("Failed to load job file {}", path.display()))?,
            None => JobParameters::default(),
        };

        if let Some(file) = self.file {
            if self.format.is_none() {
                if let Some(format) = FileFormat::from_path(&file) {
                    params.format = format;
                }
            }
            params.file_path = file;
        }
        if let Some(format) = self.format {
            params.format = format;
        }
        if let Some(schema) = self.schema {
            params.target_schema = schema;
        }
        if let Some(table) = self.table {
            params.target_table = table;
        }
        if let Some(encoding) = self.encoding {
            params.encoding = encoding;
        }
        if let Some(delimiter) = self.delimiter {
            params.delimiter = delimiter;
        }
        if let Some(batch_size) = self.batch_size {
            params.batch_size = batch_size;
        }
        if let Some(timeout) = self.timeout {
            params.timeout_secs = timeout;
        }
        params.include_headers &= !self.no_headers;
        params.truncate_before_import |= self.truncate;
        params.skip_row_errors |= self.skip_row_errors;
        params.validate_before_import |= self.validate;

        params.validate()?;
        Ok(params)
    }

    fn output_format(&self) -> OutputFormatKind {
        if self.json {
            OutputFormatKind::Json
        } else {
            OutputFormatKind::Table
        }
    }
}

fn exit_code(summary: &JobSummary) -> ExitCode {
    match summary.status {
        JobStatus::Completed => ExitCode::SUCCESS,
        JobStatus::Cancelled => ExitCode::from(EXIT_CANCELLED),
        JobStatus::Running | JobStatus::Failed(_) => ExitCode::FAILURE,
    }
}

fn open_database(path: Option<&Path>) -> anyhow::Result<SqliteDatabase> {
    let Some(path) = path else {
        bail!("No database given; pass --database or set DXPORT_DATABASE");
    };
    SqliteDatabase::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))
}

/// Cancel the token on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling job");
            child.cancel();
        }
    });
    token
}

async fn run_job(database: Option<&Path>, args: JobArgs, import: bool) -> anyhow::Result<ExitCode> {
    let output_format = args.output_format();
    let params = args.into_parameters()?;
    let db = Arc::new(open_database(database)?);
    let runner = JobRunner::new(db.clone(), db.clone(), db);
    let cancel = cancel_on_ctrl_c();

    let summary = if import {
        runner.run_import(&params, cancel).await
    } else {
        runner.run_export(&params, cancel).await
    };

    println!("{}", format_summary(&summary, output_format)?);
    Ok(exit_code(&summary))
}

fn list_formats() -> ExitCode {
    for format in FileFormat::all() {
        let direction = if format.supports_import() {
            "import, export"
        } else {
            "export"
        };
        println!("{:<12} .{:<5} {}", format.display_name(), format.extension(), direction);
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Import(args) => run_job(cli.database.as_deref(), args, true).await,
        Command::Export(args) => run_job(cli.database.as_deref(), args, false).await,
        Command::Formats => Ok(list_formats()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = logging::LoggingConfig::for_build()
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.log_json);
    let _log_guard = match logging::init(config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "dxport failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn job_args(argv: &[&str]) -> JobArgs {
        let mut full = vec!["dxport", "import"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Import(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn format_is_inferred_from_the_file() {
        let params = job_args(&["--file", "people.xlsx", "--table", "people"])
            .into_parameters()
            .unwrap();
        assert_eq!(params.format, FileFormat::Spreadsheet);
        assert_eq!(params.target_schema, "main");
        assert_eq!(params.target_table, "people");
    }

    #[test]
    fn explicit_format_wins_over_extension() {
        let params = job_args(&["--file", "dump.txt", "--format", "json", "--table", "t"])
            .into_parameters()
            .unwrap();
        assert_eq!(params.format, FileFormat::Json);
    }

    #[test]
    fn flags_override_job_file() {
        let dir = tempfile::tempdir().unwrap();
        let job = dir.path().join("nightly.toml");
        std::fs::write(
            &job,
            "format = \"csv\"\nfile_path = \"in.csv\"\ntarget_table = \"people\"\nbatch_size = 50\n",
        )
        .unwrap();

        let params = job_args(&[
            "--job",
            job.to_str().unwrap(),
            "--batch-size",
            "10",
            "--delimiter",
            "semicolon",
            "--encoding",
            "cp1252",
            "--no-headers",
            "--truncate",
        ])
        .into_parameters()
        .unwrap();

        assert_eq!(params.file_path, PathBuf::from("in.csv"));
        assert_eq!(params.target_table, "people");
        assert_eq!(params.batch_size, 10);
        assert_eq!(params.delimiter, FieldDelimiter::Semicolon);
        assert_eq!(params.encoding, TextEncoding::Codepage(1252));
        assert!(!params.include_headers);
        assert!(params.truncate_before_import);
        assert!(!params.skip_row_errors);
    }

    #[test]
    fn missing_table_is_rejected() {
        let err = job_args(&["--file", "people.csv"]).into_parameters().unwrap_err();
        assert!(err.to_string().contains("target table is required"), "{}", err);
    }

    #[test]
    fn unknown_format_fails_to_parse() {
        let err = Cli::try_parse_from(["dxport", "export", "--format", "parquet"]).unwrap_err();
        assert!(err.to_string().contains("unknown format"), "{}", err);
    }

    #[test]
    fn missing_database_is_reported() {
        let err = open_database(None).unwrap_err();
        assert!(err.to_string().contains("DXPORT_DATABASE"));
    }

    #[test]
    fn exit_codes_follow_status() {
        let table = dxport_core::TableRef::new("main", "t");
        let mut summary = JobSummary::new(dxport_interchange::JobKind::Import, &table);
        summary.status = JobStatus::Completed;
        assert_eq!(exit_code(&summary), ExitCode::SUCCESS);
        summary.status = JobStatus::Cancelled;
        assert_eq!(exit_code(&summary), ExitCode::from(EXIT_CANCELLED));
        summary.status = JobStatus::Failed("boom".into());
        assert_eq!(exit_code(&summary), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn import_then_export_through_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db");
        let db = SqliteDatabase::open(&db_path).unwrap();
        db.execute_batch("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
            .unwrap();

        let csv = dir.path().join("people.csv");
        std::fs::write(&csv, "name\nAlice\nBob\n").unwrap();
        let args = job_args(&["--file", csv.to_str().unwrap(), "--table", "people"]);
        let code = run_job(Some(&db_path), args, true).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let json = dir.path().join("people.json");
        let args = job_args(&["--file", json.to_str().unwrap(), "--table", "people"]);
        let code = run_job(Some(&db_path), args, false).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(exported[1]["name"], "Bob");
    }
}
