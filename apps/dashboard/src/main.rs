use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notes_cell::{NoteDrafterService, GENERATED_NOTE_COLUMN};
use report_cell::services::export::{timestamped_filename, write_csv};
use report_cell::services::{AppointmentDashboardService, PatientDashboardService};
use session_cell::models::Source;
use session_cell::services::SessionStoreClient;
use shared_config::EhrConfig;

#[derive(Parser)]
#[command(name = "ehr-dashboard", about = "Internal EHR dashboards and note generation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Practice Fusion patient dashboard: schedule report with insurance
    /// and transcript details, exported as CSV
    Practicefusion {
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        end_date: NaiveDate,
        /// Output CSV path (defaults to a timestamped filename)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Tebra appointment dashboard: worklist with reconciled patient IDs
    /// and billing-profile insurance, exported as CSV
    Tebra {
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        end_date: NaiveDate,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Draft one EHR note per row of a previously exported CSV
    Notes {
        /// Input CSV with patient insurance and visit data
        #[arg(long)]
        input: PathBuf,
        /// Process only the first N rows
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = EhrConfig::from_env();

    match cli.command {
        Command::Practicefusion {
            start_date,
            end_date,
            output,
        } => run_dashboard(&config, Source::Practicefusion, start_date, end_date, output).await,
        Command::Tebra {
            start_date,
            end_date,
            output,
        } => run_dashboard(&config, Source::Tebra, start_date, end_date, output).await,
        Command::Notes {
            input,
            limit,
            output,
        } => run_notes(&config, &input, limit, output).await,
    }
}

async fn run_dashboard(
    config: &EhrConfig,
    source: Source,
    start_date: NaiveDate,
    end_date: NaiveDate,
    output: Option<PathBuf>,
) -> Result<()> {
    let sessions = SessionStoreClient::new(config);
    let Some(session) = sessions.get_latest_session(source).await? else {
        bail!("No valid session found for {}; log in upstream and try again", source);
    };
    info!("Got session from store (expires {})", session.expires_at);

    let rows = match source {
        Source::Practicefusion => {
            PatientDashboardService::new(config, &session)?
                .run(start_date, end_date)
                .await?
        }
        Source::Tebra => {
            AppointmentDashboardService::new(config, &session)?
                .run(start_date, end_date)
                .await?
        }
    };

    if rows.is_empty() {
        warn!(
            "No appointments found for {} between {} and {}",
            source, start_date, end_date
        );
        return Ok(());
    }

    let path = output.unwrap_or_else(|| {
        PathBuf::from(timestamped_filename(&format!("{}_appointments", source)))
    });
    write_csv(&rows, &path)?;
    info!("Exported {} rows to {}", rows.len(), path.display());

    Ok(())
}

async fn run_notes(
    config: &EhrConfig,
    input: &PathBuf,
    limit: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    let drafter = NoteDrafterService::new(config)?;

    let mut reader = csv::Reader::from_path(input)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;

    let total = limit.unwrap_or(records.len()).min(records.len());
    info!("Loaded {} rows, processing {}", records.len(), total);

    let path = output.unwrap_or_else(|| PathBuf::from(timestamped_filename("ehr_notes_generated")));
    let mut writer = csv::Writer::from_path(&path)?;
    let mut out_headers = headers.clone();
    out_headers.push(GENERATED_NOTE_COLUMN.to_string());
    writer.write_record(&out_headers)?;

    for (index, record) in records.iter().take(total).enumerate() {
        info!("Processing row {} of {}", index + 1, total);

        let fields: Vec<(String, String)> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_owned))
            .collect();

        // Per-row isolation: a failed draft lands in the output column as
        // an inline error string and the batch keeps going.
        let note = drafter.draft_note(&fields).await;

        let mut out: Vec<String> = record.iter().map(str::to_owned).collect();
        out.push(note);
        writer.write_record(&out)?;
    }

    writer.flush()?;
    info!("Wrote {} notes to {}", total, path.display());

    Ok(())
}
