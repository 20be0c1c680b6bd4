/// Shared data structures for the labeler state
///
/// These structs are the values that flow between the image library
/// (filesystem) and the navigation state machine.
use std::path::{Path, PathBuf};

/// A single image in the review queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Full path to the image file
    path: PathBuf,
}

impl ImageEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filename only (e.g., "x.png"), the key used by autolabel sidecars
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Name of the directory the image currently sits in
    pub fn folder_name(&self) -> Option<String> {
        self.path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Outcome of a successful classify action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub class_name: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

impl Classification {
    /// True when the image was already filed in the chosen class directory
    pub fn already_filed(&self) -> bool {
        self.from == self.to
    }
}
