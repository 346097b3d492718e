//! fogo CLI: thin glue around the store and the reconciliation engine.
//!
//! Order matters in `sync`: the snapshot source is validated before the
//! database is touched, so an invalid source is fatal with zero DB mutation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use fogo_engine::{EngineConfig, PlanMode, ReconcileEngine, RunReport};
use fogo_source::GitCliSource;

#[derive(Parser)]
#[command(name = "fogo")]
#[command(about = "Wildfire lifecycle reconstruction from a snapshot log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Replay new snapshot-log commits into the store
    Sync {
        /// Path to the git checkout holding the snapshot log
        #[arg(long)]
        repo: String,

        /// Path of the snapshot file inside the repository
        #[arg(long, default_value = "fogos.json")]
        file: String,

        /// Clear the cursor first and replay the full history
        #[arg(long, default_value_t = false)]
        full: bool,

        /// Commits per write transaction
        #[arg(long, default_value_t = EngineConfig::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    /// Connectivity + schema presence
    Status,

    /// Apply embedded migrations (idempotent)
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if absent.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Db { cmd } => match cmd {
            DbCmd::Status => {
                let pool = fogo_db::connect_from_env().await?;
                let st = fogo_db::status(&pool).await?;
                println!("ok: {}", st.ok);
                println!("has fires table: {}", st.has_fires_table);
            }
            DbCmd::Migrate => {
                let pool = fogo_db::connect_from_env().await?;
                fogo_db::migrate(&pool).await?;
                println!("migrations applied");
            }
        },

        Commands::Sync {
            repo,
            file,
            full,
            batch_size,
        } => {
            // Source first: a bad path must fail before any DB mutation.
            let source = GitCliSource::open(&repo)
                .with_context(|| format!("cannot open snapshot log at '{repo}'"))?;

            let pool = fogo_db::connect_from_env().await?;
            fogo_db::migrate(&pool).await?;

            if full {
                info!("forced full rescan: clearing cursor");
                fogo_db::clear_cursor(&pool).await?;
            }

            let cfg = EngineConfig::new(file).with_batch_size(batch_size);
            let report = ReconcileEngine::new(source, pool, cfg).run().await?;
            print_report(&report);
        }
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    let mode = match report.mode {
        PlanMode::UpToDate => "up to date",
        PlanMode::FirstRun => "first run",
        PlanMode::Incremental => "incremental",
        PlanMode::FullRescan => "full rescan (cursor did not resolve)",
    };
    println!("mode:        {mode}");
    println!("planned:     {} commits", report.planned);
    println!("processed:   {} commits", report.processed);
    println!(
        "events:      {} new, {} updated, {} disappeared",
        report.new_events, report.updated_events, report.disappeared_events
    );
    println!(
        "cursor:      {}",
        report.cursor.as_deref().unwrap_or("(unset)")
    );
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
