//! The `chapterlift upload` command.

mod batch;
mod setup;

use chapterlift_core::{ChapterDiscovery, Config};
use clap::Args;
use std::path::PathBuf;

use batch::run_upload;
use setup::{collect_pages, setup_uploader};

/// Arguments for the `upload` command.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Chapter directories or page files, uploaded in the order given
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write the batch result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the batch result
    #[arg(long)]
    pub pretty: bool,

    /// Number of pages processed concurrently (default: from config)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Keep original resolution
    #[arg(long)]
    pub no_resize: bool,

    /// Shrink pages wider than this many pixels
    #[arg(long)]
    pub max_dimension: Option<u32>,

    /// JPEG quality, 1-100
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Skip real work: sleep per page and return synthetic URLs
    #[arg(long)]
    pub simulate: bool,

    /// Ignore and do not update the dedup cache
    #[arg(long)]
    pub no_cache: bool,
}

/// Execute the upload command.
pub async fn execute(args: UploadArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let pages = collect_pages(&args, &config)?;
    if pages.is_empty() {
        tracing::warn!("No supported page images found in {:?}", args.inputs);
    } else {
        tracing::info!(
            "Found {} page(s) to upload ({} bytes)",
            pages.len(),
            ChapterDiscovery::total_size(&pages)
        );
    }

    let ctx = setup_uploader(&args, config).await?;
    run_upload(ctx, &args, pages).await
}
