//! Batch scheduler: fan one task per page out under an admission gate and
//! fold the results back into an index-aligned [`BatchResult`].

use futures_util::future::join_all;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::cache::DedupCache;
use crate::error::{PipelineError, PipelineResult};
use crate::storage::RemoteUploader;
use crate::types::{BatchResult, ProgressEvent, SourceItem, TransformConfig, UploadOutcome};

use super::hash::Hasher;
use super::transform::ImageTransformer;

/// Scheduler tuning that does not change per batch.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Maximum number of pages in flight at once
    pub workers: usize,
    /// Per-page delay in simulate mode
    pub simulate_delay: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            simulate_delay: Duration::from_millis(100),
        }
    }
}

/// Runs batches of pages through read, hash, dedup, transform and upload.
#[derive(Clone)]
pub struct BatchScheduler {
    transformer: ImageTransformer,
    cache: DedupCache,
    uploader: RemoteUploader,
    options: SchedulerOptions,
}

/// Everything a task touches that is shared with its siblings.
struct BatchState<F> {
    transformer: ImageTransformer,
    cache: DedupCache,
    uploader: RemoteUploader,
    config: TransformConfig,
    simulate_delay: Duration,
    cancel: CancellationToken,
    total: usize,
    completed: AtomicUsize,
    /// Serializes increment-and-emit so `completed` never goes backwards.
    progress: Mutex<()>,
    failures: Mutex<Vec<(usize, UploadOutcome)>>,
    on_progress: F,
}

impl<F> BatchState<F>
where
    F: Fn(ProgressEvent),
{
    fn report_progress(&self) {
        let _guard = self.progress.lock().unwrap_or_else(|e| e.into_inner());
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        (self.on_progress)(ProgressEvent {
            completed,
            total: self.total,
        });
    }

    fn record_failure(&self, slot: usize, outcome: UploadOutcome) {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.push((slot, outcome));
    }
}

impl BatchScheduler {
    pub fn new(
        transformer: ImageTransformer,
        cache: DedupCache,
        uploader: RemoteUploader,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            transformer,
            cache,
            uploader,
            options,
        }
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    /// Run one batch.
    ///
    /// `links[i]` of the result belongs to `items[i]`, whatever
    /// `items[i].index` says; the index only labels simulated keys and logs.
    /// `on_progress` is called from worker tasks once per finished page,
    /// failed pages included; it may cancel `cancel` but must not block.
    pub async fn run<F>(
        &self,
        cancel: &CancellationToken,
        items: Vec<SourceItem>,
        config: TransformConfig,
        on_progress: F,
    ) -> BatchResult
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        let total = items.len();
        if total == 0 {
            return BatchResult::complete(Vec::new());
        }

        let workers = self.options.workers.max(1);
        tracing::debug!("Starting batch of {total} pages with {workers} workers");

        let state = Arc::new(BatchState {
            transformer: self.transformer.clone(),
            cache: self.cache.clone(),
            uploader: self.uploader.clone(),
            config: config.clamped(),
            simulate_delay: self.options.simulate_delay,
            cancel: cancel.clone(),
            total,
            completed: AtomicUsize::new(0),
            progress: Mutex::new(()),
            failures: Mutex::new(Vec::new()),
            on_progress,
        });

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(total);

        for (slot, item) in items.into_iter().enumerate() {
            // Submission waits here once `workers` pages are in flight.
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => permit,
            };
            let Ok(permit) = permit else {
                tracing::warn!("Admission semaphore closed unexpectedly, stopping batch");
                break;
            };

            let state = state.clone();
            let path = item.path.clone();
            let handle = tokio::spawn(async move {
                let result = process_item(&state, &item).await;
                let url = match result {
                    Ok(url) => {
                        state.report_progress();
                        Some(url)
                    }
                    Err(PipelineError::Cancelled) => None,
                    Err(e) => {
                        tracing::warn!("Page {} failed: {e}", item.index);
                        state.record_failure(
                            slot,
                            UploadOutcome::Failure {
                                source_path: item.path.clone(),
                                message: e.to_string(),
                            },
                        );
                        state.report_progress();
                        None
                    }
                };
                drop(permit);
                url
            });
            handles.push((slot, path, handle));
        }

        let joined = join_all(
            handles
                .into_iter()
                .map(|(slot, path, handle)| async move { (slot, path, handle.await) }),
        )
        .await;

        let mut links = vec![String::new(); total];
        for (slot, path, joined) in joined {
            match joined {
                Ok(Some(url)) => links[slot] = url,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Upload task for {:?} panicked: {e}", path);
                    state.record_failure(
                        slot,
                        UploadOutcome::Failure {
                            source_path: path,
                            message: format!("task panicked: {e}"),
                        },
                    );
                    state.report_progress();
                }
            }
        }

        if cancel.is_cancelled() {
            let result = BatchResult::cancelled(links);
            tracing::info!("Batch cancelled after {} of {total} pages", result.uploaded());
            return result;
        }

        let mut failures = std::mem::take(
            &mut *state.failures.lock().unwrap_or_else(|e| e.into_inner()),
        );
        if failures.is_empty() {
            return BatchResult::complete(links);
        }

        failures.sort_by_key(|(slot, _)| *slot);
        let first = failures[0].1.failure_message().unwrap_or_default();
        BatchResult::partial(links, failures.len(), first)
    }
}

/// The per-page state machine. Every await races the batch token.
async fn process_item<F>(state: &BatchState<F>, item: &SourceItem) -> PipelineResult<String> {
    let cancel = &state.cancel;
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    if state.config.simulate_only {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            _ = tokio::time::sleep(state.simulate_delay) => {}
        }
        return Ok(state
            .uploader
            .compose_url(&format!("simulated/{:04}.jpg", item.index)));
    }

    let bytes = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
        res = tokio::fs::read(&item.path) => res.map_err(|e| PipelineError::Read {
            path: item.path.clone(),
            message: e.to_string(),
        })?,
    };

    let fingerprint = Hasher::content_hash_from_bytes(&bytes);
    let cached = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
        found = state.cache.lookup(&fingerprint) => found,
    };
    if let Some(url) = cached {
        tracing::debug!("Dedup hit for {:?}: {}", item.path, url);
        return Ok(url);
    }

    let transformer = state.transformer.clone();
    let config = state.config;
    let name = file_name(&item.path);
    let transformed = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
        joined = tokio::task::spawn_blocking(move || transformer.transform(&bytes, &name, &config)) => {
            joined.map_err(|e| PipelineError::Encode {
                path: item.path.clone(),
                message: format!("transform task failed: {e}"),
            })?
        }
    };
    let asset = transformed.map_err(|e| with_source_path(e, &item.path))?;

    let url = state.uploader.upload(asset, &item.path, cancel).await?;

    if let Err(e) = state.cache.record(&fingerprint, &url).await {
        tracing::warn!("Failed to record {} in dedup cache: {e}", url);
    }
    Ok(url)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The transformer only knows the file name; report the full source path.
fn with_source_path(err: PipelineError, source: &Path) -> PipelineError {
    match err {
        PipelineError::Decode { message, .. } => PipelineError::Decode {
            path: source.to_path_buf(),
            message,
        },
        PipelineError::Encode { message, .. } => PipelineError::Encode {
            path: source.to_path_buf(),
            message,
        },
        other => other,
    }
}
