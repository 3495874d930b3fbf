//! File acquisition
//!
//! Three ways to get an image into the dashboard:
//! - the native file picker
//! - dropping files onto the window
//! - fetching one of the bundled samples from the asset host
//!
//! They all end in [`ImageSlot::select`], which swaps the active image and
//! its preview in one step.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use iced::widget::image::Handle;
use thiserror::Error;
use tracing::{debug, info};

use super::data::{
    declared_media_type, is_image_media_type, sniffed_media_type, ImageBlob, SelectedImage,
};
use super::preview::PreviewRegistry;
use crate::net::{AssetSource, FetchError};

/// Extensions offered by the native picker
const PICKER_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "webp"];

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("sample {name} could not be loaded: {source}")]
    Sample {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The single slot holding the active image
///
/// Owns every preview it hands out; at most one is live at a time.
#[derive(Debug, Default)]
pub struct ImageSlot {
    previews: PreviewRegistry,
    active: Option<SelectedImage>,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&SelectedImage> {
        self.active.as_ref()
    }

    /// Drawable preview of the active image
    pub fn preview(&self) -> Option<&Handle> {
        self.active
            .as_ref()
            .and_then(|image| self.previews.resolve(&image.preview))
    }

    /// Make `blob` the active image
    ///
    /// The previous preview is released before the new one is acquired, so
    /// no observer ever sees two live previews.
    pub fn select(&mut self, blob: ImageBlob) -> &SelectedImage {
        if let Some(previous) = self.active.take() {
            self.previews.release(Some(&previous.preview));
        }
        let preview = self.previews.acquire(&blob);
        info!("🖼️  Selected {} ({} bytes)", blob.name, blob.len());
        debug!("Preview #{} active, {} live", preview.id(), self.live_previews());
        self.active.insert(SelectedImage { blob, preview })
    }

    /// Drop the active image, releasing its preview
    pub fn clear(&mut self) {
        if let Some(previous) = self.active.take() {
            self.previews.release(Some(&previous.preview));
        }
    }

    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }
}

impl Drop for ImageSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Show the native picker and read the chosen file
///
/// `Ok(None)` when the user cancels.
pub async fn pick_image() -> Result<Option<ImageBlob>, AcquisitionError> {
    let picked = rfd::AsyncFileDialog::new()
        .set_title("Select a chest radiograph")
        .add_filter("Images", &PICKER_EXTENSIONS)
        .pick_file()
        .await;

    match picked {
        Some(handle) => read_picked(handle.path().to_path_buf()).await.map(Some),
        None => Ok(None),
    }
}

/// Read a file chosen in the picker; its media type comes from the extension
pub async fn read_picked(path: PathBuf) -> Result<ImageBlob, AcquisitionError> {
    let media_type = declared_media_type(&path).map(str::to_string);
    let data = read_file(&path).await?;
    Ok(ImageBlob::new(file_name(&path), media_type, data))
}

async fn read_file(path: &Path) -> Result<Vec<u8>, AcquisitionError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| AcquisitionError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Pick the file a drop gesture should act on
///
/// Only the first entry counts, and only when its declared media type is an
/// image type. Anything else is silently ignored.
pub fn accept_drop(paths: &[PathBuf]) -> Option<(&Path, &'static str)> {
    let first = paths.first()?;
    match declared_media_type(first) {
        Some(media_type) if is_image_media_type(media_type) => Some((first.as_path(), media_type)),
        _ => {
            debug!("Ignoring drop of {}", first.display());
            None
        }
    }
}

/// Read an accepted dropped file from disk
pub async fn read_dropped(path: PathBuf, media_type: &'static str) -> Result<ImageBlob, AcquisitionError> {
    let data = read_file(&path).await?;
    Ok(ImageBlob::new(file_name(&path), Some(media_type.to_string()), data))
}

/// Fetch a bundled sample by name and wrap it as a named file
pub async fn fetch_sample<A: AssetSource>(
    assets: Arc<A>,
    name: String,
) -> Result<ImageBlob, AcquisitionError> {
    let fetched = match assets.fetch(&format!("/samples/{name}")).await {
        Ok(fetched) => fetched,
        Err(source) => return Err(AcquisitionError::Sample { name, source }),
    };

    let media_type = fetched
        .content_type
        .as_deref()
        .map(|value| value.split(';').next().unwrap_or(value).trim())
        .filter(|value| is_image_media_type(value))
        .map(str::to_string)
        .or_else(|| sniffed_media_type(&fetched.body).map(str::to_string));

    Ok(ImageBlob::new(name, media_type, fetched.body))
}

/// Paths dropped during one drag gesture
///
/// The window reports every dropped file as a separate event; they are
/// collected here until the gesture settles.
#[derive(Debug, Default)]
pub struct DropBatch {
    pending: Vec<PathBuf>,
}

impl DropBatch {
    /// Record a dropped path. Returns `true` when it opened a new batch.
    pub fn push(&mut self, path: PathBuf) -> bool {
        self.pending.push(path);
        self.pending.len() == 1
    }

    pub fn take(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.pending)
    }
}
