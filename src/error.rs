//! Error types for the labeler.
//!
//! Every failure is local to the action that triggered it. Callers report
//! the error in the status line and keep running.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelerError {
    /// Filesystem failure (listing, creating a class directory, moving a file)
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `autolabels.json` exists but is not a valid filename -> vector map
    #[error("malformed autolabel file {}: {source}", .path.display())]
    Sidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Classify would overwrite an existing file
    #[error("{} already exists, refusing to overwrite", .dest.display())]
    DestinationExists { dest: PathBuf },

    /// Class name cannot be used as a directory name
    #[error("invalid class name {0:?}")]
    InvalidClassName(String),

    /// Preview decoding failed
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Background task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(String),
}

impl LabelerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LabelerError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LabelerError>;
