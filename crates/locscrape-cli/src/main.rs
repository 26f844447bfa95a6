mod extract;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "locscrape")]
#[command(about = "Extract store locations from listing pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch one or more pages and extract their locations
    Extract {
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Extract locations from a saved HTML file
    Parse {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show the ranked repeating class signatures of a saved HTML file
    Candidates { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = locscrape_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Extract {
            urls,
            format,
            output,
        }) => extract::run_extract(&config, &urls, format, output.as_deref()).await?,
        Some(Commands::Parse {
            file,
            format,
            output,
        }) => extract::run_parse(&file, format, output.as_deref()).await?,
        Some(Commands::Candidates { file }) => extract::run_candidates(&file).await?,
        None => println!("locscrape: try `locscrape extract <URL>` or `locscrape --help`"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
