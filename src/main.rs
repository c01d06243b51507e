use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use overtime_recon::report::{self, ColumnSpec};
use overtime_recon::{ReconError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_tracing()?;
    match cli.command {
        Command::Compare(args) => execute_compare(args),
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|error| ReconError::Logging(error.to_string()))
}

fn execute_compare(args: CompareArgs) -> Result<()> {
    for input in [&args.file_a, &args.file_b] {
        if !input.exists() {
            return Err(ReconError::MissingInput(input.clone()));
        }
    }

    let columns = ColumnSpec {
        key_column: args.key_column,
        measure_column: args.measure_column,
    };
    let sheet = args.sheet.as_deref();

    match detect_output_format(&args.output)? {
        OutputFormat::Excel => {
            report::compare_to_excel(&args.file_a, &args.file_b, &args.output, &columns, sheet)
        }
        OutputFormat::Json => {
            report::compare_to_json(&args.file_a, &args.file_b, &args.output, &columns, sheet)
        }
    }
}

fn detect_output_format(path: &Path) -> Result<OutputFormat> {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("xlsx") => Ok(OutputFormat::Excel),
        Some("json") => Ok(OutputFormat::Json),
        _ => Err(ReconError::UnsupportedOutput(path.to_path_buf())),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile a numeric column between two Excel exports."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare the measurement column of two workbooks and write a report.
    Compare(CompareArgs),
}

#[derive(clap::Args)]
struct CompareArgs {
    /// First input workbook (source "A").
    #[arg(long)]
    file_a: PathBuf,

    /// Second input workbook (source "B").
    #[arg(long)]
    file_b: PathBuf,

    /// Report destination; `.xlsx` writes the styled workbook, `.json` the
    /// raw report data.
    #[arg(long)]
    output: PathBuf,

    /// Header name of the key column shared by both inputs.
    #[arg(long)]
    key_column: String,

    /// Header name of the numeric column being compared.
    #[arg(long)]
    measure_column: String,

    /// Worksheet to read from each input; defaults to the first sheet.
    #[arg(long)]
    sheet: Option<String>,
}

#[derive(Copy, Clone, Debug)]
enum OutputFormat {
    Excel,
    Json,
}
