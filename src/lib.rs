#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # bgdrop
//!
//! Batch background-removal pipeline with per-item state tracking and
//! resource lifecycle management.
//!
//! This crate models the core of a drop-and-process UI: a set of dropped
//! images becomes an ordered [`Batch`] of [`item::ImageItem`]s, a
//! [`RemovalPipeline`] drives an external removal capability over them
//! strictly in sequence, and every preview or result blob is published
//! through a [`UriRegistry`] under an explicitly released [`ResourceHandle`]
//! so repeated drops never accumulate leaked resources.
//!
//! The background-removal algorithm itself is out of scope: it is consumed
//! through the [`BackgroundRemover`] trait, an opaque, failable, possibly
//! seconds-long async call. Drag-and-drop capture, styling, and download
//! affordances are likewise external; the crate exposes per-item and
//! pipeline-level projections ([`item::ItemView`], [`PipelineView`]) for a
//! UI to render.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bgdrop::{DroppedFile, RemovalOptions, RemovalPipeline};
//! use bgdrop::testing::MockRemover;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let files = vec![
//!     DroppedFile::new("photo.png", "image/png", std::fs::read("photo.png")?),
//! ];
//!
//! let mut pipeline =
//!     RemovalPipeline::new(Box::new(MockRemover::new()), RemovalOptions::default())?;
//! pipeline.acquire(files)?;
//!
//! let outcome = pipeline.run().await?;
//! println!("{} images processed", outcome.completed_count);
//! for view in pipeline.item_views() {
//!     println!("{} -> {:?}", view.name, view.result_uri);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Processing model
//!
//! - **Strictly sequential**: item *n+1* never starts before item *n*
//!   finishes; the removal call is the pipeline's only suspension point.
//! - **Stop on first failure**: a failed item aborts the rest of the run;
//!   later items stay `Pending` and the failure is surfaced once through
//!   [`PipelineStatus::last_error`]. Recover by dropping files again, which
//!   replaces the batch and clears the error.
//! - **Single active run**: [`RemovalPipeline::status`] exposes the busy
//!   flag a frontend uses to disable its trigger; overlapping runs and drops
//!   during a run are rejected rather than corrupting in-flight state.

pub mod batch;
pub mod config;
pub mod error;
pub mod handle;
pub mod item;
pub mod pipeline;
pub mod progress;
pub mod remover;
pub mod testing;

// Public API exports
pub use batch::Batch;
pub use config::{OutputFormat, OutputKind, RemovalOptions, RemovalOptionsBuilder};
pub use error::{BgDropError, Result, UNKNOWN_ERROR_MESSAGE};
pub use handle::{ResourceHandle, UriRegistry};
pub use item::{DroppedFile, ImageItem, ItemId, ItemStatus, ItemView};
pub use pipeline::{
    PipelineStatus, PipelineView, ProcessingFailure, RemovalPipeline, RunResult,
};
pub use progress::{
    ConsoleProgressReporter, JsonProgressReporter, NoOpProgressReporter, ProgressReporter,
};
pub use remover::{BackgroundRemover, RemoverError, RemoverResult};

/// Acquire a batch from dropped files and run it to completion in one call.
///
/// This is the one-shot convenience over [`RemovalPipeline`]: it builds a
/// pipeline, installs the files as its batch, and runs it. The pipeline is
/// returned alongside the run outcome so the published previews and results
/// stay alive for the caller to project or download.
///
/// # Errors
///
/// Returns `BgDropError` for invalid removal options. Per-item processing
/// failures do not error; they are reported in the returned [`RunResult`].
///
/// # Examples
///
/// ```rust,no_run
/// use bgdrop::{remove_background_from_files, DroppedFile, RemovalOptions};
/// use bgdrop::testing::MockRemover;
///
/// # async fn example() -> anyhow::Result<()> {
/// let files = vec![DroppedFile::new("cat.png", "image/png", vec![0x89, 0x50])];
/// let (pipeline, outcome) = remove_background_from_files(
///     files,
///     Box::new(MockRemover::new()),
///     RemovalOptions::default(),
/// )
/// .await?;
/// assert_eq!(outcome.completed_count, 1);
/// # drop(pipeline);
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_files(
    files: Vec<DroppedFile>,
    remover: Box<dyn BackgroundRemover>,
    options: RemovalOptions,
) -> Result<(RemovalPipeline, RunResult)> {
    let mut pipeline = RemovalPipeline::new(remover, options)?;
    pipeline.acquire(files)?;
    let outcome = pipeline.run().await?;
    Ok((pipeline, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRemover;

    #[tokio::test]
    async fn test_one_shot_api() {
        let files = vec![
            DroppedFile::new("a.png", "image/png", vec![1]),
            DroppedFile::new("b.png", "image/png", vec![2]),
        ];
        let (pipeline, outcome) = remove_background_from_files(
            files,
            Box::new(MockRemover::new()),
            RemovalOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.completed_count, 2);
        assert!(outcome.is_complete());
        assert!(pipeline
            .item_views()
            .iter()
            .all(|view| view.result_uri.is_some()));
    }
}
