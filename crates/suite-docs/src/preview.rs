//! # Previews
//!
//! In-memory PDF buffers handed out for viewing.
//!
//! Every buffer lives in the [`PreviewRegistry`] until its [`PreviewHandle`]
//! is closed or dropped, so opening previews repeatedly does not grow memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use crate::error::{DocError, DocResult};

type Buffers = HashMap<Uuid, Arc<[u8]>>;

/// Shared store of open preview buffers.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    buffers: Arc<Mutex<Buffers>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Buffers> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.buffers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stores `bytes` and returns the handle that owns them.
    pub fn open(&self, bytes: Vec<u8>, file_name: impl Into<String>) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.lock().insert(id, bytes.into());
        let file_name = file_name.into();
        debug!(%id, file = %file_name, "Preview opened");
        PreviewHandle {
            id,
            file_name,
            registry: self.clone(),
        }
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn get(&self, id: &Uuid) -> Option<Arc<[u8]>> {
        self.lock().get(id).cloned()
    }

    fn revoke(&self, id: &Uuid) {
        if self.lock().remove(id).is_some() {
            debug!(%id, "Preview released");
        }
    }
}

/// Owner of one preview buffer. Releases it on [`close`](Self::close) or drop.
pub struct PreviewHandle {
    id: Uuid,
    file_name: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Opaque URL identifying the buffer, e.g. `preview://<uuid>`.
    pub fn url(&self) -> String {
        format!("preview://{}", self.id)
    }

    /// The PDF bytes.
    pub fn bytes(&self) -> DocResult<Arc<[u8]>> {
        self.registry.get(&self.id).ok_or_else(|| DocError::PreviewReleased {
            id: self.id.to_string(),
        })
    }

    pub fn close(self) {
        // Drop revokes.
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.id);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_releases_buffer() {
        let registry = PreviewRegistry::new();
        let handle = registry.open(b"%PDF-1.3".to_vec(), "Quotation-q-1.pdf");
        assert_eq!(registry.len(), 1);
        assert_eq!(&*handle.bytes().unwrap(), b"%PDF-1.3");
        assert!(handle.url().starts_with("preview://"));

        handle.close();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_drop_releases_buffer() {
        let registry = PreviewRegistry::new();
        for _ in 0..5 {
            let _handle = registry.open(vec![0; 16], "x.pdf");
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_released_buffer_errors() {
        let registry = PreviewRegistry::new();
        let handle = registry.open(vec![1], "x.pdf");
        registry.revoke(&handle.id());
        assert!(matches!(handle.bytes(), Err(DocError::PreviewReleased { .. })));
    }
}
