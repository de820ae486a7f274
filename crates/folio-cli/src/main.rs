//! Folio - a command-line back office for the portfolio and storefront APIs.
//!
//! Lists, creates, edits and deletes services, plans, projects,
//! testimonials and messages on the portfolio site, and products, customers,
//! sales and ledger transactions in the store.

mod commands;
mod render;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use folio_core::cache::DEFAULT_PER_PAGE;
use folio_core::config::API_URL_ENV;
use folio_core::models::DEFAULT_LOW_STOCK_THRESHOLD;
use folio_core::{CacheError, ListQuery};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{AppContext, ResourceKind};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Back office for portfolio and storefront REST APIs")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// API base URL (overrides the config file)
    #[arg(long, env = API_URL_ENV, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and save the session
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Keep the password in the OS keychain for automatic re-login
        #[arg(long)]
        remember: bool,
    },
    /// Forget the saved session
    Logout {
        /// Also remove the remembered password
        #[arg(long)]
        forget: bool,
    },
    /// Show the API URL and session state
    Status,
    /// List records, a page at a time
    List {
        resource: ResourceKind,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
        /// Only show records containing this text
        #[arg(long)]
        search: Option<String>,
        /// Print the page as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print one record as JSON
    Show { resource: ResourceKind, id: String },
    /// Create a record from a JSON object (inline, or @file)
    Create {
        resource: ResourceKind,
        #[arg(long)]
        data: String,
    },
    /// Patch a record with a JSON object (inline, or @file)
    Update {
        resource: ResourceKind,
        id: String,
        #[arg(long)]
        data: String,
    },
    /// Delete a record
    Delete { resource: ResourceKind, id: String },
    /// Finance totals and low-stock products
    Summary {
        /// Flag products with this many units or fewer
        #[arg(long, default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
        low_stock: u32,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the log file when dropped.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // RUST_LOG controls the level unless -v is given
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("--log-file must name a file"))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guard = match init_tracing(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("folio starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {}", e);
            if e
                .downcast_ref::<CacheError>()
                .is_some_and(CacheError::is_unauthorized)
            {
                eprintln!("Run `folio login` to sign in again.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut ctx = AppContext::load(cli.api_url)?;

    match cli.command {
        Command::Login { email, remember } => commands::login(&mut ctx, email, remember).await,
        Command::Logout { forget } => commands::logout(&mut ctx, forget),
        Command::Status => commands::status(&mut ctx),
        Command::List {
            resource,
            page,
            per_page,
            search,
            json,
        } => {
            let store = ctx.open_store().await?;
            let mut query = ListQuery::new().page(page).per_page(per_page);
            if let Some(term) = search {
                query = query.search(term);
            }
            commands::list(&store, resource, &query, json).await
        }
        Command::Show { resource, id } => {
            let store = ctx.open_store().await?;
            commands::show(&store, resource, &id).await
        }
        Command::Create { resource, data } => {
            let store = ctx.open_store().await?;
            commands::create(&store, resource, &data).await
        }
        Command::Update { resource, id, data } => {
            let store = ctx.open_store().await?;
            commands::update(&store, resource, &id, &data).await
        }
        Command::Delete { resource, id } => {
            let store = ctx.open_store().await?;
            commands::delete(&store, resource, &id).await
        }
        Command::Summary { low_stock } => {
            let store = ctx.open_store().await?;
            commands::summary(&store, low_stock).await
        }
    }
}
