/// State management module
///
/// This module handles everything the labeler knows about the open directory:
/// - Directory scanning and file moves (library.rs)
/// - Shared data structures (data.rs)
/// - The class set and its free-text editing (classes.rs)
/// - Autolabel sidecars (autolabels.rs)
/// - The navigation/labeling state machine (browser.rs)

pub mod autolabels;
pub mod browser;
pub mod classes;
pub mod data;
pub mod library;

pub use browser::{BrowserState, Phase};
pub use classes::ClassSet;
