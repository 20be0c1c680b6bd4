//! Application configuration constants.

/// Extension (case-insensitive) of the files the labeler picks up.
pub const IMAGE_EXTENSION: &str = "png";

/// Sidecar holding per-image class confidences, looked up in every scanned directory.
pub const AUTOLABEL_FILENAME: &str = "autolabels.json";

/// Class set used until a directory with class subdirectories is opened.
pub const DEFAULT_CLASSES: [&str; 7] = [
    "center_surround",
    "color",
    "gabor",
    "mult_freq",
    "noise",
    "simple_edge",
    "unclassifiable",
];

/// Smallest window the layout still works in
pub const MIN_WINDOW_SIZE: (f32, f32) = (400.0, 400.0);

pub const CLASS_BUTTON_HEIGHT: f32 = 160.0;

/// Gap kept around the preview inside its frame
pub const IMAGE_PADDING: f32 = 25.0;
