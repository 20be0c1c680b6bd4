/// Preview loading
///
/// Decodes the current image into an RGBA handle iced can draw. Decoding
/// runs on tokio's blocking pool so large images do not stall the UI.
use iced::widget::image::Handle;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;

use crate::error::{LabelerError, Result};

/// A decoded image ready for display
#[derive(Debug, Clone)]
pub struct Preview {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub handle: Handle,
}

/// Decode `path` off the UI thread
pub async fn load_preview(path: PathBuf) -> Result<Preview> {
    task::spawn_blocking(move || decode(&path))
        .await
        .map_err(|e| LabelerError::Task(e.to_string()))?
}

fn decode(path: &Path) -> Result<Preview> {
    let start = Instant::now();

    let rgba = image::open(path)
        .map_err(|source| LabelerError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    log::debug!(
        "Decoded {} ({}x{}) in {:?}",
        path.display(),
        width,
        height,
        start.elapsed()
    );

    Ok(Preview {
        path: path.to_path_buf(),
        width,
        height,
        handle: Handle::from_rgba(width, height, rgba.into_raw()),
    })
}
