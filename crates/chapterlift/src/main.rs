//! Chapterlift CLI - upload manga chapters and get back public page URLs.
//!
//! Pages are shrunk, re-encoded to JPEG and uploaded concurrently; the batch
//! result is printed as JSON with one link per input page, in input order.
//!
//! # Usage
//!
//! ```bash
//! # Upload a chapter directory
//! chapterlift upload "./Chapter 12/"
//!
//! # Keep full resolution, write the result to a file
//! chapterlift upload ./ch12 --no-resize --output links.json
//!
//! # Inspect the bucket
//! chapterlift storage list
//!
//! # View configuration
//! chapterlift config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Chapterlift - batch transform-and-upload for manga chapters.
#[derive(Parser, Debug)]
#[command(name = "chapterlift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Transform and upload chapter pages
    Upload(cli::upload::UploadArgs),

    /// List or delete stored objects
    Storage(cli::storage::StorageArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match chapterlift_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `chapterlift config path`."
            );
            chapterlift_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Chapterlift v{}", chapterlift_core::VERSION);

    match cli.command {
        Commands::Upload(args) => cli::upload::execute(args).await,
        Commands::Storage(args) => cli::storage::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
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
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["chapterlift", "config", "path", "--verbose", "--json-logs"])
            .unwrap();
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Config(_)));
    }
}
