//! Preview handle lifecycle
//!
//! A preview handle is a revocable reference to image data that the view
//! can display before anything is uploaded. The registry owns the decoded
//! iced handle; once released, the handle no longer resolves and the image
//! bytes are dropped as soon as the renderer lets go of them.

use std::collections::HashMap;

use iced::widget::image::Handle;
use tracing::debug;

use super::data::ImageBlob;

/// Opaque id of a preview issued by a [`PreviewRegistry`]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    id: u64,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Issues and revokes preview handles
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<u64, Handle>,
    next_id: u64,
}

impl PreviewRegistry {
    /// Create a displayable preview for an image blob
    pub fn acquire(&mut self, blob: &ImageBlob) -> PreviewHandle {
        self.next_id += 1;
        let id = self.next_id;
        let handle = Handle::from_bytes(blob.data.as_ref().clone());
        self.live.insert(id, handle);
        debug!("Acquired preview #{} for {}", id, blob.name);
        PreviewHandle { id }
    }

    /// Revoke a preview handle
    ///
    /// Safe to call with `None` or with a handle that was already released.
    /// Returns `true` only when a live handle was actually revoked.
    pub fn release(&mut self, handle: Option<&PreviewHandle>) -> bool {
        let Some(handle) = handle else {
            return false;
        };
        let released = self.live.remove(&handle.id).is_some();
        if released {
            debug!("Released preview #{}", handle.id);
        }
        released
    }

    /// Resolve a preview to something the image widget can draw
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<&Handle> {
        self.live.get(&handle.id)
    }

    /// Number of previews that have not been released
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
