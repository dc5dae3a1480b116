//! Ordered batches of dropped images
//!
//! A [`Batch`] owns its items exclusively and is replaced wholesale on each
//! new drop. Replacement and teardown go through [`Batch::dispose`], which
//! releases every publication the batch owns; dropping a batch does the same
//! through the handles' own destructors, so nothing leaks either way.

use crate::handle::UriRegistry;
use crate::item::{DroppedFile, ImageItem, ItemId, ItemStatus, ItemView};
use std::sync::Arc;
use tracing::debug;

/// Ordered collection of [`ImageItem`]s, in drop/acquisition order.
///
/// Order is both display order and processing order.
#[derive(Debug, Default)]
pub struct Batch {
    items: Vec<ImageItem>,
}

impl Batch {
    /// Wrap a sequence of dropped files as pending items, publishing a
    /// preview for each so the UI can render thumbnails immediately.
    ///
    /// Non-image inputs are the upstream collaborator's problem; the batch
    /// does not validate content.
    #[must_use]
    pub fn from_files(files: Vec<DroppedFile>, registry: &Arc<UriRegistry>) -> Self {
        let items: Vec<ImageItem> = files
            .into_iter()
            .map(|file| ImageItem::new(file, registry))
            .collect();
        debug!(count = items.len(), "acquired batch");
        Self { items }
    }

    /// Items in processing order
    #[must_use]
    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    /// Number of items in the batch
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by identity
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ImageItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether any item has left the `Pending` state.
    ///
    /// A batch that has been (even partially) run is consumed; processing it
    /// again requires a fresh drop.
    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.status() != ItemStatus::Pending)
    }

    /// Per-item projections for the UI
    #[must_use]
    pub fn views(&self) -> Vec<ItemView> {
        self.items.iter().map(ImageItem::view).collect()
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut ImageItem> {
        self.items.get_mut(index)
    }

    /// Release every publication owned by this batch's items.
    ///
    /// Idempotent per handle; called on batch replacement and at session end.
    pub fn dispose(&mut self) {
        debug!(count = self.items.len(), "disposing batch");
        for item in &mut self.items {
            item.release_handles();
        }
    }
}
