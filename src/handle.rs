//! Publication and lifecycle of in-memory binary resources
//!
//! The drop-and-process UI shows previews and offers downloads through
//! dereferenceable URIs backed by in-memory blobs, the way a browser hands out
//! object URLs. [`UriRegistry`] is the in-process analogue of that publication
//! table, and [`ResourceHandle`] is the owning side of one publication: it is
//! released exactly once, either explicitly or when the handle is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::trace;

/// Registry of published binary blobs, keyed by URI.
///
/// A blob inserted via [`UriRegistry::publish`] stays dereferenceable until the
/// returned [`ResourceHandle`] is released. The registry is shared between the
/// pipeline (which publishes) and the UI projection (which dereferences).
#[derive(Debug, Default)]
pub struct UriRegistry {
    entries: Mutex<HashMap<String, Arc<[u8]>>>,
    next_id: AtomicU64,
}

impl UriRegistry {
    /// Create a new, empty registry behind a shared pointer
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Publish a blob under a fresh URI and return its owning handle.
    ///
    /// The `label` only makes URIs human-readable in logs; uniqueness comes
    /// from a monotonic counter.
    #[must_use]
    pub fn publish(self: &Arc<Self>, bytes: Arc<[u8]>, label: &str) -> ResourceHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let uri = format!("mem://bgdrop/{id}/{label}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.clone(), bytes);
        trace!(uri = %uri, "published resource");
        ResourceHandle {
            uri,
            registry: Arc::downgrade(self),
            released: false,
        }
    }

    /// Dereference a URI, returning the published bytes if still live
    #[must_use]
    pub fn resolve(&self, uri: &str) -> Option<Arc<[u8]>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .cloned()
    }

    /// Number of currently live publications
    #[must_use]
    pub fn published_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn revoke(&self, uri: &str) {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri)
            .is_some();
        trace!(uri = %uri, removed, "revoked resource");
    }
}

/// Owning handle over one published blob.
///
/// Exactly one publication, released at most once: [`ResourceHandle::release`]
/// is guarded by an internal flag, and dropping an unreleased handle releases
/// it, so neither double-release nor a leak is possible through this type.
#[derive(Debug)]
pub struct ResourceHandle {
    uri: String,
    registry: Weak<UriRegistry>,
    released: bool,
}

impl ResourceHandle {
    /// The dereferenceable URI of this publication.
    ///
    /// Valid until [`ResourceHandle::release`] is called; the string itself
    /// stays readable afterwards but no longer resolves.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Whether this handle has already been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Revoke the publication. Safe to call more than once; only the first
    /// call reaches the registry.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(registry) = self.registry.upgrade() {
            registry.revoke(&self.uri);
        }
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(data: &[u8]) -> Arc<[u8]> {
        Arc::from(data.to_vec().into_boxed_slice())
    }

    #[test]
    fn test_publish_and_resolve() {
        let registry = UriRegistry::new();
        let handle = registry.publish(blob(b"png bytes"), "preview");

        assert!(handle.uri().starts_with("mem://bgdrop/"));
        assert_eq!(registry.published_count(), 1);
        let resolved = registry.resolve(handle.uri()).unwrap();
        assert_eq!(&resolved[..], b"png bytes");
    }

    #[test]
    fn test_uris_are_unique_per_publication() {
        let registry = UriRegistry::new();
        let a = registry.publish(blob(b"same"), "preview");
        let b = registry.publish(blob(b"same"), "preview");
        assert_ne!(a.uri(), b.uri());
    }

    #[test]
    fn test_release_revokes_exactly_once() {
        let registry = UriRegistry::new();
        let mut handle = registry.publish(blob(b"data"), "result");
        let uri = handle.uri().to_string();

        handle.release();
        assert!(handle.is_released());
        assert!(registry.resolve(&uri).is_none());
        assert_eq!(registry.published_count(), 0);

        // Second release is a no-op even if another publication reused state
        let _other = registry.publish(blob(b"data"), "result");
        handle.release();
        assert_eq!(registry.published_count(), 1);
    }

    #[test]
    fn test_drop_releases_unreleased_handle() {
        let registry = UriRegistry::new();
        let uri = {
            let handle = registry.publish(blob(b"data"), "preview");
            handle.uri().to_string()
        };
        assert!(registry.resolve(&uri).is_none());
        assert_eq!(registry.published_count(), 0);
    }

    #[test]
    fn test_release_after_registry_dropped_is_safe() {
        let registry = UriRegistry::new();
        let mut handle = registry.publish(blob(b"data"), "preview");
        drop(registry);
        handle.release();
        assert!(handle.is_released());
    }
}
