//! Test support: a scriptable in-memory remover
//!
//! Provides a mock implementation of [`BackgroundRemover`] so the pipeline
//! can be exercised without a real segmentation backend. Used by this crate's
//! own tests and available to downstream consumers for theirs.

use crate::config::RemovalOptions;
use crate::remover::{BackgroundRemover, RemoverResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Error type produced by [`MockRemover`] failures.
///
/// Displays its message verbatim, so an empty message exercises the
/// pipeline's generic-fallback path.
#[derive(Debug)]
pub struct MockFailure(pub String);

impl std::fmt::Display for MockFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MockFailure {}

/// Scriptable remover for tests.
///
/// Succeeds by default, returning the input prefixed with `nobg:`. Can be
/// configured to fail on a specific call, to carry a custom (possibly empty)
/// failure message, and to sleep before answering so tests get a real
/// suspension point. Counters are shared across clones for verification.
#[derive(Debug, Clone)]
pub struct MockRemover {
    delay: Option<Duration>,
    fail_on_call: Option<usize>,
    failure_message: String,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockRemover {
    /// Create a mock remover that succeeds on every call
    #[must_use]
    pub fn new() -> Self {
        Self {
            delay: None,
            fail_on_call: None,
            failure_message: "mock removal failure".to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock remover that fails on the given 1-based call
    #[must_use]
    pub fn failing_on_call(call: usize) -> Self {
        let mut remover = Self::new();
        remover.fail_on_call = Some(call);
        remover
    }

    /// Set the message carried by injected failures (may be empty)
    #[must_use]
    pub fn with_failure_message<S: Into<String>>(mut self, message: S) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Sleep for `delay` inside every call, making the suspension observable
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Total number of calls received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }

    /// Highest number of calls ever observed in flight at once
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::Acquire)
    }
}

impl Default for MockRemover {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackgroundRemover for MockRemover {
    async fn remove_background(&self, image: &[u8], _options: &RemovalOptions) -> RemoverResult {
        let call = self.calls.fetch_add(1, Ordering::AcqRel) + 1;
        let in_flight = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::AcqRel);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome: RemoverResult = if self.fail_on_call == Some(call) {
            Err(Box::new(MockFailure(self.failure_message.clone())))
        } else {
            Ok([b"nobg:".as_slice(), image].concat())
        };

        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        outcome
    }
}
