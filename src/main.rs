mod commands;
mod config;
mod error;
mod models;
mod render;
mod services;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::render::TerminalSurface;
use crate::services::api::HttpReceiptApi;
use crate::services::controller::Controller;
use crate::services::state::Tab;

#[derive(Parser)]
#[command(name = "receipt-desk")]
#[command(about = "Upload invoices for extraction and manage stored receipts", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the extraction service
    #[arg(long, env = "RECEIPT_DESK_URL", default_value = DEFAULT_BASE_URL, global = true)]
    url: String,

    /// Request timeout in seconds
    #[arg(long, env = "RECEIPT_DESK_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Tab shown when an interactive session starts
    #[arg(long, value_parser = ["upload", "receipts"], default_value = "upload", global = true)]
    tab: String,

    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a PDF and show the extracted invoice JSON
    Upload {
        file: Option<PathBuf>,

        /// Save the JSON to this file or directory
        #[arg(long)]
        save: Option<PathBuf>,

        /// Open the saved JSON afterwards
        #[arg(long)]
        open: bool,

        /// Also print the JSON as an embeddable data: URI
        #[arg(long)]
        data_uri: bool,
    },
    /// Show stored receipts with their summary
    Receipts,
    /// Delete a stored receipt
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Interactive tabbed session (default)
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let tab: Tab = cli.tab.parse().map_err(anyhow::Error::msg)?;
    let config = ClientConfig::new(&cli.url, cli.timeout, tab)?;
    info!(url = %config.base_url, timeout = ?config.timeout, "client configured");

    let api = HttpReceiptApi::new(&config)?;
    let mut controller = Controller::new(api, TerminalSurface::default(), config);

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Upload {
            file,
            save,
            open,
            data_uri,
        } => {
            commands::upload::upload_invoice(&mut controller, file.as_deref(), save, open, data_uri).await?;
        }
        Commands::Receipts => commands::receipts::list_receipts(&mut controller).await?,
        Commands::Delete { id, yes } => {
            commands::receipts::delete_receipt(&mut controller, id, yes).await?;
        }
        Commands::Session => commands::session::run_session(&mut controller).await?,
    }

    Ok(())
}
