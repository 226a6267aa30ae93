mod collect;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::CollectArgs;

#[derive(Debug, Parser)]
#[command(name = "mapscrape")]
#[command(about = "Collect business listings from map search results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one collection session and write the records as JSON
    Collect(CollectArgs),
    /// Print the effective selector table as YAML
    Selectors {
        /// Selector override file (defaults to MAPSCRAPE_SELECTORS_PATH)
        #[arg(long)]
        selectors: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = mapscrape_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Collect(args) => collect::run_collect(&config, &args).await,
        Commands::Selectors { selectors } => {
            let path = selectors.or_else(|| config.selectors_path.clone());
            let table = mapscrape_core::load_selector_table(path.as_deref())?;
            print!("{}", table.to_yaml()?);
            Ok(())
        }
    }
}
