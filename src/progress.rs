//! Progress reporting for pipeline runs
//!
//! Separates progress concerns from the run loop so different frontends can
//! plug in their own handling. Callbacks fire incrementally: `on_item_start`
//! is invoked before the removal call begins, which is what lets a UI key a
//! "processing" overlay to the active item while the pipeline is suspended.

use crate::item::ItemId;
use std::time::Duration;

/// Observer of per-item and per-run pipeline transitions
pub trait ProgressReporter: Send + Sync {
    /// Called once when a run starts
    fn on_run_start(&self, total_items: usize);

    /// Called when an item enters `Processing`, before the removal call
    fn on_item_start(&self, id: ItemId, name: &str, index: usize, total: usize);

    /// Called when an item's removal call succeeds
    fn on_item_complete(&self, id: ItemId, name: &str, elapsed: Duration);

    /// Called when an item's removal call fails; the run stops after this
    fn on_item_error(&self, id: ItemId, name: &str, message: &str);

    /// Called once when the run ends, successfully or not
    fn on_run_complete(&self, completed: usize, failed: bool, elapsed: Duration);
}

/// No-operation progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    /// Create a new no-op progress reporter
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NoOpProgressReporter {
    fn on_run_start(&self, _total_items: usize) {}
    fn on_item_start(&self, _id: ItemId, _name: &str, _index: usize, _total: usize) {}
    fn on_item_complete(&self, _id: ItemId, _name: &str, _elapsed: Duration) {}
    fn on_item_error(&self, _id: ItemId, _name: &str, _message: &str) {}
    fn on_run_complete(&self, _completed: usize, _failed: bool, _elapsed: Duration) {}
}

/// Console-based progress reporter
#[derive(Debug)]
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    #[must_use]
    pub fn new() -> Self {
        Self { verbose: true }
    }

    /// Create a quiet console progress reporter (errors only)
    #[must_use]
    pub fn quiet() -> Self {
        Self { verbose: false }
    }
}

impl Default for ConsoleProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_run_start(&self, total_items: usize) {
        if self.verbose {
            println!("Starting batch processing of {} images...", total_items);
        }
    }

    fn on_item_start(&self, _id: ItemId, name: &str, index: usize, total: usize) {
        if self.verbose {
            println!("[{}/{}] Processing: {}", index + 1, total, name);
        }
    }

    fn on_item_complete(&self, _id: ItemId, name: &str, elapsed: Duration) {
        if self.verbose {
            println!("Completed: {} ({}ms)", name, elapsed.as_millis());
        }
    }

    fn on_item_error(&self, _id: ItemId, name: &str, message: &str) {
        eprintln!("Failed: {} - {}", name, message);
    }

    fn on_run_complete(&self, completed: usize, failed: bool, elapsed: Duration) {
        println!(
            "Batch complete: {} processed in {:.2}s",
            completed,
            elapsed.as_secs_f64()
        );
        if failed {
            println!("  run stopped at first failure");
        }
    }
}

/// JSON-based progress reporter for programmatic consumers
#[derive(Debug, Default)]
pub struct JsonProgressReporter;

impl JsonProgressReporter {
    /// Create a new JSON progress reporter
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for JsonProgressReporter {
    fn on_run_start(&self, total_items: usize) {
        println!(
            "{}",
            serde_json::json!({"event": "run_start", "total_items": total_items})
        );
    }

    fn on_item_start(&self, id: ItemId, name: &str, index: usize, total: usize) {
        println!(
            "{}",
            serde_json::json!({
                "event": "item_start",
                "identity": id,
                "name": name,
                "index": index,
                "total": total,
            })
        );
    }

    fn on_item_complete(&self, id: ItemId, name: &str, elapsed: Duration) {
        println!(
            "{}",
            serde_json::json!({
                "event": "item_complete",
                "identity": id,
                "name": name,
                "elapsed_ms": elapsed.as_millis() as u64,
            })
        );
    }

    fn on_item_error(&self, id: ItemId, name: &str, message: &str) {
        println!(
            "{}",
            serde_json::json!({
                "event": "item_error",
                "identity": id,
                "name": name,
                "error": message,
            })
        );
    }

    fn on_run_complete(&self, completed: usize, failed: bool, elapsed: Duration) {
        println!(
            "{}",
            serde_json::json!({
                "event": "run_complete",
                "completed": completed,
                "failed": failed,
                "elapsed_ms": elapsed.as_millis() as u64,
            })
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::UriRegistry;
    use crate::item::{DroppedFile, ImageItem};

    #[test]
    fn test_reporters_accept_all_events() {
        let registry = UriRegistry::new();
        let item = ImageItem::new(
            DroppedFile::new("a.png", "image/png", vec![0]),
            &registry,
        );

        let reporters: Vec<Box<dyn ProgressReporter>> = vec![
            Box::new(NoOpProgressReporter::new()),
            Box::new(ConsoleProgressReporter::quiet()),
            Box::new(JsonProgressReporter::new()),
        ];
        for reporter in reporters {
            reporter.on_run_start(1);
            reporter.on_item_start(item.id(), item.name(), 0, 1);
            reporter.on_item_complete(item.id(), item.name(), Duration::from_millis(3));
            reporter.on_item_error(item.id(), item.name(), "boom");
            reporter.on_run_complete(1, true, Duration::from_millis(7));
        }
    }
}
