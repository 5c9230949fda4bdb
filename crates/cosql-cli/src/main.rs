mod app;
mod config;
mod cosmos;
mod logging;
mod terminal;
mod ui;

use std::io::{self, IsTerminal};
use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use cosql_core::paging::DEFAULT_PAGE_SIZE;

use crate::config::{Config, ConnectionMode};
use crate::cosmos::CosmosClient;

#[derive(Debug, Parser)]
#[command(name = "cosql", about = "Interactive SQL console for Azure Cosmos DB")]
struct Cli {
    /// Azure Cosmos DB account endpoint URI
    #[arg(long)]
    endpoint: String,

    /// Azure Cosmos DB account read access key
    #[arg(long)]
    key: String,

    /// Target database to use
    #[arg(long)]
    database: String,

    /// Target container to use
    #[arg(long)]
    container: String,

    /// Connection policy
    #[arg(long = "cp", value_enum, ignore_case = true, default_value_t = CliMode::Direct)]
    connection_policy: CliMode,

    /// Number of items per fetch
    #[arg(long = "maxfetchsize", default_value_t = DEFAULT_PAGE_SIZE)]
    max_fetch_size: NonZeroU32,

    /// Include query metrics after every page
    #[arg(long, default_value_t = false)]
    metrics: bool,

    /// Disable ANSI color
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum CliMode {
    Direct,
    Gateway,
}

impl Cli {
    fn config(&self) -> Config {
        let mode = match self.connection_policy {
            CliMode::Direct => ConnectionMode::Direct,
            CliMode::Gateway => ConnectionMode::Gateway,
        };
        Config {
            endpoint: self.endpoint.clone(),
            key: self.key.clone(),
            database: self.database.clone(),
            container: self.container.clone(),
            mode,
            page_size: self.max_fetch_size,
            metrics: self.metrics,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        bail!("cosql needs an interactive terminal");
    }

    terminal::install_panic_restore();
    let _logging = logging::init(cli.log_dir.clone());
    let config = cli.config();
    tracing::info!(?config, "starting");

    let source = CosmosClient::connect(&config).context("cannot create Cosmos DB client")?;
    let mut app = app::App::new(config, ui::theme::build_theme(cli.no_color));
    app.run(&source)
}
