//! Terminal - status dashboard server

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use terminal::config::{self, TerminalConfig};
use terminal::storage::SqliteStore;
use terminal::ui::{self, Icons};
use terminal::AdvisoryService;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "terminal")]
#[command(version)]
#[command(about = "Status dashboard - operational advisories and service versions")]
#[command(long_about = r#"
Terminal serves a dashboard plus a small JSON API:
  GET    /advisories                         list advisories, most severe first
  PUT    /advisories?type=alert&message=...  create an advisory
  DELETE /advisories?id=N                    delete an advisory
  GET    /services                           current version per service and env
  PUT    /services?name=..&env=..&version=.. report a version

Write parameters may also be sent as a form-urlencoded body.
Version reports are cleared on every start and on shutdown.

Example usage:
  terminal --port 8080 --database terminal.db
  terminal --database :memory: --verbose
"#)]
struct Cli {
    /// The port for the app server to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Path to the database file (`:memory:` for a throwaway store)
    #[arg(short, long)]
    database: Option<String>,

    /// Directory holding css/, js/ and img/
    #[arg(long)]
    static_dir: Option<String>,

    /// Path to the config file (defaults to terminal.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Overwrite an existing config file
    #[arg(long, requires = "write_config")]
    force: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> TerminalConfig {
        TerminalConfig {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            static_dir: self.static_dir.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ui::failure(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Config and storage setup is synchronous; the async runtime only starts
/// once the store is open.
fn run(cli: Cli) -> anyhow::Result<()> {
    let effective = config::load_config(cli.config.as_deref())?.merge(cli.overrides());
    let settings = effective.resolve()?;

    if cli.write_config {
        let path = cli.config.clone().unwrap_or_else(config::default_config_path);
        config::write_config(&path, &settings, cli.force)?;
        ui::done(&format!("Wrote configuration to {}", path.display()));
        return Ok(());
    }

    config::ensure_db_dir(&settings.database)?;

    ui::banner("Terminal status dashboard");
    ui::field(Icons::DATABASE, "Database", settings.database.display());
    if settings.is_in_memory() {
        ui::caution("In-memory database: advisories will not survive a restart");
    }

    // opening the store clears version reports left over from the last run
    let store = SqliteStore::open(&settings.database)?;
    let stats = store.stats()?;
    tracing::debug!("{}", stats);

    let advisories = AdvisoryService::new(store.clone()).list_advisories()?;
    ui::heading(&format!("{} open advisories", advisories.len()));
    ui::advisory_summary(&advisories);
    ui::field(Icons::INFO, "Static files", settings.static_dir.display());
    println!();

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(terminal::server::start_server(settings.addr, store, &settings.static_dir))
}
