use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::data::ImageEntry;
use crate::config::IMAGE_EXTENSION;
use crate::error::{LabelerError, Result};

/// Immediate children of `directory`, in path order.
///
/// A directory that does not exist has no children.
fn children(directory: &Path) -> Result<Vec<walkdir::DirEntry>> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.map_err(|e| LabelerError::io(directory, e.into())))
        .collect()
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
        .unwrap_or(false)
}

/// Scan a directory (not recursively) for image files
pub fn scan_images(directory: &Path) -> Result<Vec<ImageEntry>> {
    let images = children(directory)?
        .into_iter()
        .filter(|entry| entry.file_type().is_file() && has_image_extension(entry.path()))
        .map(|entry| ImageEntry::new(entry.into_path()))
        .collect();
    Ok(images)
}

/// Immediate subdirectories of `directory`
pub fn list_subdirectories(directory: &Path) -> Result<Vec<PathBuf>> {
    let dirs = children(directory)?
        .into_iter()
        .filter(|entry| entry.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect();
    Ok(dirs)
}

/// Names of the immediate subdirectories, used as a class set
pub fn subdirectory_names(directory: &Path) -> Result<Vec<String>> {
    let names = list_subdirectories(directory)?
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    Ok(names)
}

/// Reject class names that are not exactly one normal path component
pub fn validate_class_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if name.trim() == name => Ok(()),
        _ => Err(LabelerError::InvalidClassName(name.to_string())),
    }
}

/// Move `image` into `class_dir`, creating the directory if needed.
///
/// Never overwrites: an existing destination is reported as
/// `LabelerError::DestinationExists` and the source is left in place.
/// Returns the new path.
pub fn move_into(image: &Path, class_dir: &Path) -> Result<PathBuf> {
    let filename = image
        .file_name()
        .ok_or_else(|| LabelerError::io(image, std::io::ErrorKind::InvalidInput.into()))?;
    let dest = class_dir.join(filename);

    if dest.exists() {
        return Err(LabelerError::DestinationExists { dest });
    }

    fs::create_dir_all(class_dir).map_err(|e| LabelerError::io(class_dir, e))?;
    fs::rename(image, &dest).map_err(|e| LabelerError::io(image, e))?;

    Ok(dest)
}
