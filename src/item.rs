//! Per-image processing records
//!
//! An [`ImageItem`] is the unit of work of the pipeline: the immutable source
//! bytes of one dropped file plus the mutable state the run drives through.
//! Identity is synthetic (a monotonic sequence number), never the file name:
//! two dropped files may share a name, and UI keying must survive that.

use crate::handle::{ResourceHandle, UriRegistry};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Stable synthetic identity of an [`ImageItem`], unique per process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of the identity
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub(crate) fn from_raw(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub(crate) fn to_raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Processing state of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemStatus {
    /// Not yet picked up by a run
    Pending,
    /// Currently inside the removal call (at most one item per batch)
    Processing,
    /// Removal succeeded, result handle published
    Done,
    /// Removal failed; the run stopped here
    Failed,
}

/// One file as delivered by the upstream drop target.
///
/// Inputs are expected to be pre-filtered to image MIME types; the pipeline
/// does not validate image content.
#[derive(Debug, Clone)]
pub struct DroppedFile {
    /// Original file name, kept for display and download naming
    pub name: String,
    /// MIME type as reported by the drop source
    pub mime_type: String,
    /// Raw file content, read once at acquisition time
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    /// Convenience constructor
    pub fn new<N: Into<String>, M: Into<String>>(name: N, mime_type: M, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// One image's processing record: source bytes, status, and handles.
///
/// The preview handle is published at construction so the UI can render a
/// thumbnail before any processing; the result handle exists iff the item
/// reached [`ItemStatus::Done`].
#[derive(Debug)]
pub struct ImageItem {
    id: ItemId,
    name: String,
    mime_type: String,
    source: Arc<[u8]>,
    preview: ResourceHandle,
    result: Option<ResourceHandle>,
    status: ItemStatus,
}

impl ImageItem {
    /// Wrap a dropped file as a pending item, publishing its preview
    #[must_use]
    pub fn new(file: DroppedFile, registry: &Arc<UriRegistry>) -> Self {
        let source: Arc<[u8]> = Arc::from(file.bytes.into_boxed_slice());
        let preview = registry.publish(Arc::clone(&source), "preview");
        Self {
            id: ItemId::next(),
            name: file.name,
            mime_type: file.mime_type,
            source,
            preview,
            result: None,
            status: ItemStatus::Pending,
        }
    }

    /// Synthetic identity of this item
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Original file name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type reported at acquisition
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Current processing status
    #[must_use]
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Immutable source bytes (shared, cheap to clone)
    #[must_use]
    pub fn source(&self) -> Arc<[u8]> {
        Arc::clone(&self.source)
    }

    /// URI of the always-present preview publication
    #[must_use]
    pub fn preview_uri(&self) -> &str {
        self.preview.uri()
    }

    /// URI of the processed result, present iff the item is `Done`
    #[must_use]
    pub fn result_uri(&self) -> Option<&str> {
        self.result.as_ref().map(ResourceHandle::uri)
    }

    /// Suggested filename for downloading the processed result
    #[must_use]
    pub fn download_filename(&self) -> String {
        format!("nobg-{}", self.name)
    }

    pub(crate) fn start_processing(&mut self) {
        self.status = ItemStatus::Processing;
    }

    pub(crate) fn complete(&mut self, result: ResourceHandle) {
        self.result = Some(result);
        self.status = ItemStatus::Done;
    }

    pub(crate) fn fail(&mut self) {
        self.status = ItemStatus::Failed;
    }

    /// Release every publication owned by this item. Idempotent.
    pub(crate) fn release_handles(&mut self) {
        self.preview.release();
        if let Some(result) = self.result.as_mut() {
            result.release();
        }
    }

    /// Snapshot of the fields the UI projection renders
    #[must_use]
    pub fn view(&self) -> ItemView {
        ItemView {
            identity: self.id,
            name: self.name.clone(),
            status: self.status,
            preview_uri: self.preview.uri().to_string(),
            result_uri: self.result_uri().map(str::to_string),
            download_filename: self.download_filename(),
        }
    }
}

/// Per-item projection exposed to the UI
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    /// Stable key for list rendering
    pub identity: ItemId,
    /// Display name (not unique)
    pub name: String,
    /// Current status, drives the processing overlay
    pub status: ItemStatus,
    /// Thumbnail URI, always present
    pub preview_uri: String,
    /// Download URI, present once processed
    pub result_uri: Option<String>,
    /// Suggested download filename (`nobg-<name>`)
    pub download_filename: String,
}
