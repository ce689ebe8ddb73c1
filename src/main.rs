use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use portfolio_import::concurrent_importer::SharedImporter;
use portfolio_import::config::Settings;
use portfolio_import::importer::Importer;
use portfolio_import::models::{FinancialRecord, RecordDetails, RecordKind};
use portfolio_import::persistence::{JsonFileStore, RecordStore};

#[derive(Parser)]
#[command(
    name = "portfolio-import",
    version,
    about = "Import and export portfolio transactions and dividends"
)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Record store file (overrides settings)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Print reports and listings as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import one or more CSV files
    Import {
        #[arg(long, short)]
        kind: RecordKind,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Export stored records as CSV
    Export {
        #[arg(long, short)]
        kind: RecordKind,
        /// Output file, stdout if omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List stored records
    List {
        #[arg(long, short)]
        kind: RecordKind,
    },
    /// Delete stored records by id
    Delete {
        #[arg(long, short)]
        kind: RecordKind,
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.settings.as_deref()).context("Failed to load settings")?;
    if let Some(store) = cli.store {
        settings.store_path = store;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut store = JsonFileStore::open(&settings.store_path).with_context(|| {
        format!(
            "Failed to open record store '{}'",
            settings.store_path.display()
        )
    })?;

    match cli.command {
        Command::Import { kind, files } => {
            let importer = SharedImporter::new(store, settings.import_options());
            let mut jobs = Vec::with_capacity(files.len());
            for file in &files {
                let contents = fs::read(file)
                    .with_context(|| format!("Failed to read input file '{}'", file.display()))?;
                jobs.push((kind, contents));
            }

            let mut failed = 0;
            for (file, result) in files.iter().zip(importer.import_all(jobs).await) {
                match result {
                    Ok(report) if cli.json => {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    }
                    Ok(report) => print!("{}: {}", file.display(), report),
                    Err(e) => {
                        failed += 1;
                        error!(file = %file.display(), "Import failed: {e}");
                    }
                }
            }
            anyhow::ensure!(failed == 0, "{} of {} imports failed", failed, files.len());
        }
        Command::Export { kind, output } => {
            let importer = Importer::with_options(store, settings.import_options());
            let written = match output {
                Some(path) => {
                    let file = File::create(&path).with_context(|| {
                        format!("Failed to create output file '{}'", path.display())
                    })?;
                    importer.export(kind, file)?
                }
                None => importer.export(kind, io::stdout().lock())?,
            };
            tracing::info!(%kind, written, "Export finished");
        }
        Command::List { kind } => {
            let records = store.list_all(kind)?;
            let mut out = io::stdout().lock();
            if cli.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            } else {
                for record in &records {
                    writeln!(out, "{}", describe(record))?;
                }
            }
        }
        Command::Delete { kind, ids } => {
            let removed = store.delete_many(kind, &ids)?;
            println!("Deleted {removed} of {} {kind} records", ids.len());
        }
    }

    Ok(())
}

fn describe(record: &FinancialRecord) -> String {
    let figures = match &record.details {
        RecordDetails::Trade {
            quantity,
            price,
            commission,
            ..
        } => format!("{quantity} @ {price} (commission {commission})"),
        RecordDetails::Dividend { amount } => amount.to_string(),
    };
    format!(
        "{:>6}  {}  {:<9}  {:<12}  {:<8}  {} {}",
        record.id.to_string(),
        record.transaction_date,
        record.type_tag(),
        record.account,
        record.symbol,
        figures,
        record.currency
    )
}
