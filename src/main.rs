use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use leave_accrual::{
    config::{accrual, database},
    core::{
        run_log, schedule,
        trigger::{self, AccrualRequest},
    },
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Monthly leave accrual and carry-over job
#[derive(Debug, Parser)]
#[command(name = "leave-accrual", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Accrue one month now
    RunMonthlyAccrual {
        /// Leave type code (CL or EL); every configured type when omitted
        #[arg(long)]
        leave_type: Option<String>,
        /// Target month (1-12)
        #[arg(long)]
        month: u32,
        /// Target year
        #[arg(long)]
        year: i32,
        /// Credit the month again even if it was already accrued
        #[arg(long)]
        testing_mode: bool,
    },
    /// Run the monthly scheduler until stopped
    Schedule,
    /// Show recent cron runs
    ShowRuns {
        /// Number of runs to show
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load accrual settings
    let settings = accrual::load_default_settings()
        .inspect_err(|e| error!("Failed to load accrual configuration: {}", e))?;
    info!(
        leave_types = settings.leave_types.len(),
        testing_mode = settings.testing_mode,
        "Accrual configuration loaded"
    );

    // 4. Connect and make sure the tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    match cli.command {
        Command::RunMonthlyAccrual {
            leave_type,
            month,
            year,
            testing_mode,
        } => {
            let request = AccrualRequest::for_manual_run(
                &settings,
                year,
                month,
                leave_type.as_deref(),
                testing_mode,
            )?;

            let report = trigger::run_monthly_accrual(&db, &settings, &request).await?;
            println!("{}", trigger::format_run_report(&report));
        }
        Command::Schedule => {
            schedule::run_scheduler(&db, &settings).await?;
        }
        Command::ShowRuns { limit } => {
            for run in run_log::recent_runs(&db, limit).await? {
                let completed = run
                    .completed_at
                    .map_or_else(|| "running".to_string(), |t| t.to_rfc3339());
                println!(
                    "#{} {} started {} completed {} rows {} {}",
                    run.id,
                    run.request_id,
                    run.started_at.to_rfc3339(),
                    completed,
                    run.rows_affected.unwrap_or_default(),
                    run.error_message.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
