//! Batch run: progress bar, Ctrl-C cancellation, result output.

use chapterlift_core::pipeline::DiscoveredFile;
use chapterlift_core::{BatchResult, ChapterDiscovery, OutputFormat, OutputWriter};
use std::fs::File;
use std::io::BufWriter;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use super::setup::UploadContext;
use super::UploadArgs;

/// Run the batch and emit its result.
///
/// Returns an error (non-zero exit) when the batch did not fully succeed.
pub async fn run_upload(
    ctx: UploadContext,
    args: &UploadArgs,
    pages: Vec<DiscoveredFile>,
) -> anyhow::Result<()> {
    let total = pages.len();
    let progress = create_progress_bar(total as u64);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling upload");
                cancel.cancel();
            }
        })
    };

    let start_time = Instant::now();
    let bar = progress.clone();
    let result = ctx
        .lift
        .run(&cancel, ChapterDiscovery::source_items(&pages), ctx.transform, move |event| {
            bar.set_position(event.completed as u64);
            let elapsed = bar.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                bar.set_message(format!("{:.1} pages/sec", event.completed as f64 / elapsed));
            }
        })
        .await;
    ctrl_c.abort();

    let elapsed = start_time.elapsed();
    progress.finish_and_clear();

    write_result(&result, args)?;
    print_summary(&result, total, elapsed);

    if !result.success {
        anyhow::bail!("Upload failed: {}", result.error);
    }
    Ok(())
}

fn write_result(result: &BatchResult, args: &UploadArgs) -> anyhow::Result<()> {
    if let Some(output_path) = &args.output {
        let file = File::create(output_path)?;
        let mut writer = OutputWriter::new(BufWriter::new(file), OutputFormat::Json, args.pretty);
        writer.write(result)?;
        writer.flush()?;
        tracing::info!("Result written to {:?}", output_path);
    } else {
        let mut writer = OutputWriter::new(std::io::stdout().lock(), OutputFormat::Json, args.pretty);
        writer.write(result)?;
        writer.flush()?;
    }
    Ok(())
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the batch.
fn print_summary(result: &BatchResult, total: usize, elapsed: Duration) {
    let uploaded = result.uploaded();
    let rate = if elapsed.as_secs_f64() > 0.0 {
        uploaded as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Uploaded:     {:>8}", uploaded);
    if uploaded < total {
        eprintln!("    Missing:      {:>8}", total - uploaded);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} pages/sec", rate);
    if !result.error.is_empty() {
        eprintln!("  ------------------------------------");
        eprintln!("    {}", result.error);
    }
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(output: Option<PathBuf>, pretty: bool) -> UploadArgs {
        UploadArgs {
            inputs: vec![],
            output,
            pretty,
            parallel: None,
            no_resize: false,
            max_dimension: None,
            quality: None,
            simulate: false,
            no_cache: false,
        }
    }

    #[test]
    fn write_result_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let result = BatchResult::complete(vec!["https://cdn/1_a.jpg".to_string()]);

        write_result(&result, &args(Some(path.clone()), false)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: BatchResult = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn write_pretty_result_keeps_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let result = BatchResult::cancelled(vec![String::new(); 2]);

        write_result(&result, &args(Some(path.clone()), true)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains('\n'));
        assert!(content.contains("cancelled"));
    }

    #[test]
    fn progress_bar_has_total() {
        let pb = create_progress_bar(12);
        assert_eq!(pb.length(), Some(12));
    }
}
