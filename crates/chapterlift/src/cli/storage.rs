//! The `chapterlift storage` command: inspect and prune the bucket.

use chapterlift_core::{Config, ObjectStoreFactory, OutputFormat as CoreOutputFormat, OutputWriter};
use clap::{Args, Subcommand, ValueEnum};

/// Arguments for the `storage` command.
#[derive(Args, Debug)]
pub struct StorageArgs {
    #[command(subcommand)]
    pub command: StorageCommand,
}

/// Subcommands for object storage.
#[derive(Subcommand, Debug)]
pub enum StorageCommand {
    /// List objects in the configured bucket
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "jsonl")]
        format: ListFormat,
    },

    /// Delete objects by key
    Delete {
        /// Object keys to delete
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

/// Listing formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ListFormat {
    /// One JSON array
    Json,
    /// One object per line
    Jsonl,
}

impl From<ListFormat> for CoreOutputFormat {
    fn from(format: ListFormat) -> Self {
        match format {
            ListFormat::Json => CoreOutputFormat::Json,
            ListFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Execute the storage command.
pub async fn execute(args: StorageArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let store = ObjectStoreFactory::create(&config.storage).await?;

    match args.command {
        StorageCommand::List { format } => {
            let objects = store.list().await?;
            tracing::info!(
                "{} object(s) in {} ({})",
                objects.len(),
                config.storage.bucket,
                store.name()
            );
            let mut writer = OutputWriter::new(std::io::stdout().lock(), format.into(), false);
            writer.write_all(&objects)?;
            writer.flush()?;
        }

        StorageCommand::Delete { keys } => {
            store.delete(&keys).await?;
            tracing::info!("Deleted {} object(s) from {}", keys.len(), config.storage.bucket);
        }
    }

    Ok(())
}
