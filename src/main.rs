use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clinical_ingest::{config, run_ingest, IngestConfig};

#[derive(Parser)]
#[command(name = "clinical-ingest", version)]
#[command(about = "Reconcile clinical CSV record sets into the records database")]
struct Cli {
    /// Directory holding patients.csv, doctors.csv, visits.csv, diagnoses.csv,
    /// medications.csv, lab_results.csv and reports.csv
    #[arg(long, env = "CLINICAL_INGEST_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// SQLite database file (created if missing)
    #[arg(long, env = "CLINICAL_INGEST_DATABASE")]
    database: Option<PathBuf>,

    /// Print the report as JSON instead of summary lines
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Ingest failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let mut ingest = IngestConfig::new(&cli.data_dir);
    if let Some(path) = cli.database {
        ingest = ingest.with_database(path);
    }

    let report = run_ingest(&ingest)
        .with_context(|| format!("ingesting {}", ingest.data_dir.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
