mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "procure")]
#[command(about = "Search home-improvement retailers and save normalized listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every configured store for a product query.
    Search {
        /// Free-text product query; multiple words are joined with spaces.
        #[arg(required = true)]
        query: Vec<String>,

        /// Source catalog to load instead of `PROCURE_SOURCES_PATH`.
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Directory for the CSV output instead of `PROCURE_OUTPUT_DIR`.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print results without writing a CSV file.
        #[arg(long)]
        no_save: bool,
    },
    /// List the stores in the source catalog.
    Sources {
        #[arg(long)]
        sources: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = procure_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Search {
            query,
            sources,
            output_dir,
            no_save,
        } => {
            let query = query.join(" ");
            let sources_path = sources.unwrap_or_else(|| config.sources_path.clone());
            let output_dir = if no_save {
                None
            } else {
                Some(output_dir.unwrap_or_else(|| config.output_dir.clone()))
            };
            search::run_search(&config, &query, &sources_path, output_dir.as_deref()).await?;
        }
        Commands::Sources { sources } => {
            let sources_path = sources.unwrap_or_else(|| config.sources_path.clone());
            search::list_sources(&sources_path)?;
        }
    }

    Ok(())
}
