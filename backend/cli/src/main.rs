mod config;
mod config_cmd;
mod extract_cmd;
mod inventory_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use shelfscan_logging::init_logger;

use config::{resolve_config_path, Settings};
use config_cmd::ConfigCommands;
use inventory_cmd::{IngestArgs, ScanArgs};

#[derive(Parser)]
#[command(name = "shelfscan")]
#[command(about = "ShelfScan: product label extraction and shelf inventory")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.shelfscan/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a product record from label text (file or stdin)
    Extract {
        /// Label text file; reads stdin when omitted or "-"
        file: Option<PathBuf>,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ingest label text files into an inventory ledger
    Ingest(IngestArgs),
    /// Analyze label images with a vision provider and build a ledger
    Scan(ScanArgs),
    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the file fails validation.
    let command = match cli.command {
        Commands::Config(command) => {
            let path = resolve_config_path(cli.config.as_deref());
            return config_cmd::run(&path, command).await;
        }
        command => command,
    };

    let settings = Settings::load(cli.config.as_deref()).await?;
    init_logger(settings.log_dir().as_deref(), &settings.log_level());
    settings.log_warnings();
    debug!(config = %settings.path.display(), "Settings loaded");

    match command {
        Commands::Extract { file, json } => extract_cmd::run(&settings, file, json).await,
        Commands::Ingest(args) => inventory_cmd::run_ingest(&settings, args).await,
        Commands::Scan(args) => inventory_cmd::run_scan(&settings, args).await,
        Commands::Config(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scan_with_provider() {
        let cli = Cli::try_parse_from(["shelfscan", "scan", "a.jpg", "b.png", "--provider", "openai"]).unwrap();
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.images.len(), 2);
                assert_eq!(args.provider.as_deref(), Some("openai"));
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn ingest_requires_files() {
        assert!(Cli::try_parse_from(["shelfscan", "ingest"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["shelfscan", "config", "path", "--config", "/tmp/c.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
    }
}
