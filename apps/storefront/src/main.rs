//! # Loom Storefront CLI
//!
//! Admin entry point: exports CSV reports and prints dashboard figures from
//! the storefront database.
//!
//! ```text
//! loom-storefront [--config FILE] [--db FILE] report SALES_ALL --lang en
//! loom-storefront stats
//! loom-storefront sync-balances
//! ```
//!
//! Logs go to stderr so a report written to stdout stays clean.

use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use loom_core::export::Lang;
use loom_storefront::commands::{client, report};
use loom_storefront::{init_tracing, open_storefront, StorefrontConfig};

#[derive(Debug, Parser)]
#[command(name = "loom-storefront", version, about = "Loom Wholesale storefront tools")]
struct Cli {
    /// Path to storefront.toml (defaults to the platform config directory)
    #[arg(long, env = "LOOM_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the configured path
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export one CSV report (SUPPLIER, CLIENTS, CLIENT_LEDGER, SALES_ALL, ...)
    Report {
        kind: String,

        /// Header language: ru, en or ky
        #[arg(long)]
        lang: Option<Lang>,

        /// Limit CLIENT_LEDGER to one client id
        #[arg(long)]
        client: Option<String>,

        /// Directory to write the file into; stdout when neither this nor
        /// `[export] output_dir` is set
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print dashboard figures as JSON
    Stats,

    /// Recompute every client's balance from orders and payments
    SyncBalances,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = StorefrontConfig::load(cli.config)?;
    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }
    let output_dir = config.export.output_dir.clone();

    let storefront = open_storefront(config).await?;

    match cli.command {
        Command::Report {
            kind,
            lang,
            client: client_id,
            out,
        } => {
            let today = Local::now().date_naive();
            let exported = report::export_report(&storefront, &kind, lang, client_id.as_deref(), today);

            match out.or(output_dir) {
                Some(dir) => {
                    std::fs::create_dir_all(&dir)?;
                    let path = dir.join(&exported.filename);
                    std::fs::write(&path, exported.content.as_bytes())?;
                    info!(path = %path.display(), rows = exported.row_count, "Report written");
                }
                None => print!("{}", exported.content),
            }
        }
        Command::Stats => {
            let stats = report::dashboard(&storefront);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::SyncBalances => {
            let updated = client::sync_all_balances(&storefront).await;
            info!(clients = updated, "Balances synchronised");
        }
    }

    storefront.flush().await;
    if storefront.failed_writes() > 0 {
        error!(failed = storefront.failed_writes(), "Some writes were not persisted");
    }
    Ok(())
}
