//! Abstraction over the external background-removal capability

use crate::config::RemovalOptions;
use async_trait::async_trait;

/// Errors produced by a remover are opaque; the pipeline only extracts a
/// human-readable message from them.
pub type RemoverError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of one removal call: encoded output bytes or an opaque failure
pub type RemoverResult = Result<Vec<u8>, RemoverError>;

/// The external removal capability consumed by the pipeline.
///
/// Implementations are long-running and may take seconds per call; the
/// pipeline awaits each call to completion before touching the next item
/// (removal is assumed memory- and CPU-intensive enough that concurrent
/// invocations are undesirable in a single process).
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Strip the background from one encoded image.
    ///
    /// # Errors
    /// Any failure of the underlying capability. The error's display form is
    /// surfaced to the UI; an empty one falls back to a generic message.
    async fn remove_background(&self, image: &[u8], options: &RemovalOptions) -> RemoverResult;
}
