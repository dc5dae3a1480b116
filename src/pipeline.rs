//! Sequential batch run driver
//!
//! [`RemovalPipeline`] holds the single active [`Batch`] (a new drop replaces
//! it wholesale, releasing the old batch's publications first) and drives the
//! external removal capability over it strictly in order. The removal call is
//! the only suspension point; while it is pending, the shared
//! [`PipelineStatus`] is what a UI polls for the busy flag and the active
//! item, and the [`ProgressReporter`] receives each transition as it happens.

use crate::batch::Batch;
use crate::config::RemovalOptions;
use crate::error::{failure_message, BgDropError, Result};
use crate::handle::UriRegistry;
use crate::item::{ItemId, ItemView};
use crate::progress::{NoOpProgressReporter, ProgressReporter};
use crate::remover::BackgroundRemover;
use instant::Instant;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Number of items that reached `Done`
    pub completed_count: usize,
    /// The failure that stopped the run, if any
    pub first_failure: Option<ProcessingFailure>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunResult {
    /// Whether every item in the batch was processed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.first_failure.is_none()
    }
}

/// The single failure kind a run can surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingFailure {
    /// Identity of the item whose removal call failed
    pub identity: ItemId,
    /// Human-readable message extracted from the underlying failure
    pub message: String,
}

impl std::fmt::Display for ProcessingFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.identity, self.message)
    }
}

/// Pipeline-level projection exposed to the UI
#[derive(Debug, Clone, Serialize)]
pub struct PipelineView {
    /// True while a run is in progress; the run trigger must be disabled
    pub busy: bool,
    /// Identity of the item currently `Processing`, if any
    pub active: Option<ItemId>,
    /// Last surfaced failure message, cleared when a run starts or a new
    /// batch is dropped
    pub error: Option<String>,
}

/// Shared mutable run state. `active` is non-zero iff exactly one item is
/// `Processing`.
#[derive(Debug, Default)]
struct PipelineState {
    busy: AtomicBool,
    active: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl PipelineState {
    fn try_begin_run(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn end_run(&self) {
        self.active.store(0, Ordering::Release);
        self.busy.store(false, Ordering::Release);
    }

    fn set_active(&self, id: Option<ItemId>) {
        self.active
            .store(id.map_or(0, ItemId::to_raw), Ordering::Release);
    }

    fn set_last_error(&self, message: Option<String>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = message;
    }

    fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Cloneable, thread-safe view onto a pipeline's run state.
///
/// This is what a UI holds while [`RemovalPipeline::run`] is suspended in the
/// removal call: the pipeline itself is exclusively borrowed by the run, but
/// the status keeps the busy flag and active identity observable.
#[derive(Debug, Clone)]
pub struct PipelineStatus {
    state: Arc<PipelineState>,
}

impl PipelineStatus {
    /// Whether a run is currently in progress
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.busy.load(Ordering::Acquire)
    }

    /// Identity of the item currently being processed, if any
    #[must_use]
    pub fn active(&self) -> Option<ItemId> {
        ItemId::from_raw(self.state.active.load(Ordering::Acquire))
    }

    /// Last surfaced failure message, if any
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state.last_error()
    }

    /// Consistent-enough snapshot for rendering
    #[must_use]
    pub fn snapshot(&self) -> PipelineView {
        PipelineView {
            busy: self.is_busy(),
            active: self.active(),
            error: self.last_error(),
        }
    }
}

/// Sequential driver over the active batch.
///
/// Owns the remover, the fixed removal options, the publication registry, and
/// the batch slot. One logical thread of control: acquisition mutates between
/// runs, the run loop mutates during a run, and the two never overlap because
/// acquisition is rejected while busy.
pub struct RemovalPipeline {
    remover: Box<dyn BackgroundRemover>,
    options: RemovalOptions,
    registry: Arc<UriRegistry>,
    state: Arc<PipelineState>,
    reporter: Box<dyn ProgressReporter>,
    batch: Option<Batch>,
}

impl RemovalPipeline {
    /// Create a pipeline with no progress reporting
    ///
    /// # Errors
    /// - Invalid removal options
    pub fn new(remover: Box<dyn BackgroundRemover>, options: RemovalOptions) -> Result<Self> {
        Self::with_reporter(remover, options, Box::new(NoOpProgressReporter::new()))
    }

    /// Create a pipeline with a custom progress reporter
    ///
    /// # Errors
    /// - Invalid removal options
    pub fn with_reporter(
        remover: Box<dyn BackgroundRemover>,
        options: RemovalOptions,
        reporter: Box<dyn ProgressReporter>,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            remover,
            options,
            registry: UriRegistry::new(),
            state: Arc::new(PipelineState::default()),
            reporter,
            batch: None,
        })
    }

    /// The registry previews and results are published into
    #[must_use]
    pub fn registry(&self) -> Arc<UriRegistry> {
        Arc::clone(&self.registry)
    }

    /// Shared status handle for concurrent observation
    #[must_use]
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            state: Arc::clone(&self.state),
        }
    }

    /// The currently loaded batch, if any
    #[must_use]
    pub fn batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    /// Per-item projections of the current batch
    #[must_use]
    pub fn item_views(&self) -> Vec<ItemView> {
        self.batch.as_ref().map(Batch::views).unwrap_or_default()
    }

    /// Replace the active batch with a freshly dropped set of files.
    ///
    /// Releases every publication of the prior batch before the new one
    /// becomes observable, and clears any surfaced error. Rejected while a
    /// run is in progress rather than corrupting it.
    ///
    /// # Errors
    /// - [`BgDropError::Busy`] if a run is in progress
    pub fn acquire(&mut self, files: Vec<crate::item::DroppedFile>) -> Result<()> {
        if self.state.busy.load(Ordering::Acquire) {
            return Err(BgDropError::busy(
                "cannot replace the batch while a run is in progress",
            ));
        }
        if let Some(mut old) = self.batch.take() {
            old.dispose();
        }
        self.state.set_last_error(None);
        let batch = Batch::from_files(files, &self.registry);
        info!(items = batch.len(), "batch acquired");
        self.batch = Some(batch);
        Ok(())
    }

    /// Process every pending item of the active batch, strictly in order.
    ///
    /// Each item transitions `Pending -> Processing -> Done` on success. The
    /// first failure marks its item `Failed`, records the surfaced message,
    /// and stops the run; later items stay `Pending`. The returned
    /// [`RunResult`] mirrors what the status handle and reporter already
    /// observed incrementally.
    ///
    /// # Errors
    /// - [`BgDropError::Busy`] if another run is in progress
    /// - [`BgDropError::InvalidConfig`] if no batch is loaded or the batch
    ///   was already run (drop files again to retry)
    pub async fn run(&mut self) -> Result<RunResult> {
        let total = match self.batch.as_ref() {
            Some(batch) if batch.is_processed() => {
                return Err(BgDropError::invalid_config(
                    "batch already processed; drop files again to retry",
                ));
            },
            Some(batch) => batch.len(),
            None => return Err(BgDropError::invalid_config("no batch loaded")),
        };

        if !self.state.try_begin_run() {
            return Err(BgDropError::busy("a run is already in progress"));
        }
        let guard = RunGuard {
            state: self.state.as_ref(),
        };
        self.state.set_last_error(None);

        info!(items = total, "starting pipeline run");
        let started = Instant::now();
        self.reporter.on_run_start(total);

        let mut completed = 0;
        let mut first_failure = None;

        for index in 0..total {
            let (id, name, source) = match self.batch.as_mut().and_then(|b| b.item_mut(index)) {
                Some(item) => {
                    item.start_processing();
                    (item.id(), item.name().to_string(), item.source())
                },
                None => break,
            };
            self.state.set_active(Some(id));
            self.reporter.on_item_start(id, &name, index, total);
            debug!(%id, name = %name, index, "processing item");

            let item_started = Instant::now();
            // The only suspension point of the pipeline. Nothing else runs
            // against the batch until this resolves.
            let outcome = self.remover.remove_background(&source, &self.options).await;

            match outcome {
                Ok(bytes) => {
                    let result = self
                        .registry
                        .publish(Arc::from(bytes.into_boxed_slice()), "result");
                    if let Some(item) = self.batch.as_mut().and_then(|b| b.item_mut(index)) {
                        item.complete(result);
                    }
                    self.state.set_active(None);
                    self.reporter
                        .on_item_complete(id, &name, item_started.elapsed());
                    completed += 1;
                },
                Err(err) => {
                    let message = failure_message(err.as_ref());
                    if let Some(item) = self.batch.as_mut().and_then(|b| b.item_mut(index)) {
                        item.fail();
                    }
                    self.state.set_active(None);
                    self.state.set_last_error(Some(message.clone()));
                    self.reporter.on_item_error(id, &name, &message);
                    warn!(%id, name = %name, error = %message, "run stopped at first failure");
                    first_failure = Some(ProcessingFailure {
                        identity: id,
                        message,
                    });
                    break;
                },
            }
        }

        drop(guard);
        let elapsed = started.elapsed();
        self.reporter
            .on_run_complete(completed, first_failure.is_some(), elapsed);
        info!(completed, failed = first_failure.is_some(), "pipeline run finished");

        Ok(RunResult {
            completed_count: completed,
            first_failure,
            elapsed,
        })
    }

    /// Release every publication of the active batch and discard it.
    ///
    /// Safe to call at session end even after the batch was already disposed.
    pub fn dispose(&mut self) {
        if let Some(mut batch) = self.batch.take() {
            batch.dispose();
        }
    }
}

/// Clears busy/active even if the run future is dropped mid-await.
struct RunGuard<'a> {
    state: &'a PipelineState,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.end_run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{DroppedFile, ItemStatus};
    use crate::testing::MockRemover;

    fn files(names: &[&str]) -> Vec<DroppedFile> {
        names
            .iter()
            .map(|name| DroppedFile::new(*name, "image/png", name.as_bytes().to_vec()))
            .collect()
    }

    fn pipeline(remover: MockRemover) -> RemovalPipeline {
        RemovalPipeline::new(Box::new(remover), RemovalOptions::default()).unwrap()
    }

    #[test]
    fn test_invalid_options_rejected_at_construction() {
        let options = RemovalOptions {
            quality: 2.0,
            ..RemovalOptions::default()
        };
        let result = RemovalPipeline::new(Box::new(MockRemover::new()), options);
        assert!(matches!(result, Err(BgDropError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_run_without_batch_is_rejected() {
        let mut pipeline = pipeline(MockRemover::new());
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, BgDropError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_run_completes_with_nothing() {
        let mut pipeline = pipeline(MockRemover::new());
        pipeline.acquire(Vec::new()).unwrap();
        let result = pipeline.run().await.unwrap();
        assert_eq!(result.completed_count, 0);
        assert!(result.is_complete());
        assert!(!pipeline.status().is_busy());
    }

    #[tokio::test]
    async fn test_rerun_of_processed_batch_is_rejected() {
        let mut pipeline = pipeline(MockRemover::new());
        pipeline.acquire(files(&["a.png"])).unwrap();
        pipeline.run().await.unwrap();

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, BgDropError::InvalidConfig(_)));

        // A fresh drop makes the pipeline runnable again
        pipeline.acquire(files(&["b.png"])).unwrap();
        let result = pipeline.run().await.unwrap();
        assert_eq!(result.completed_count, 1);
    }

    #[tokio::test]
    async fn test_acquire_clears_surfaced_error() {
        let mut pipeline = pipeline(MockRemover::failing_on_call(1));
        pipeline.acquire(files(&["a.png"])).unwrap();
        pipeline.run().await.unwrap();
        assert!(pipeline.status().last_error().is_some());

        pipeline.acquire(files(&["b.png"])).unwrap();
        assert!(pipeline.status().last_error().is_none());
    }

    #[tokio::test]
    async fn test_status_is_idle_after_run() {
        let mut pipeline = pipeline(MockRemover::new());
        pipeline.acquire(files(&["a.png", "b.png"])).unwrap();
        pipeline.run().await.unwrap();

        let view = pipeline.status().snapshot();
        assert!(!view.busy);
        assert!(view.active.is_none());
        assert!(view.error.is_none());
        for item in pipeline.batch().unwrap().items() {
            assert_eq!(item.status(), ItemStatus::Done);
        }
    }

    #[tokio::test]
    async fn test_dispose_releases_results_and_previews() {
        let mut pipeline = pipeline(MockRemover::new());
        let registry = pipeline.registry();
        pipeline.acquire(files(&["a.png", "b.png"])).unwrap();
        pipeline.run().await.unwrap();
        assert_eq!(registry.published_count(), 4);

        pipeline.dispose();
        assert_eq!(registry.published_count(), 0);
        pipeline.dispose();
        assert_eq!(registry.published_count(), 0);
    }
}
