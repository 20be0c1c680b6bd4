//! Navigation/labeling state machine.
//!
//! `BrowserState` owns everything the labeler knows about the open directory:
//! the image queue, the cursor into it, the class set and the autolabel map.
//! Every transition computes its result before touching `self`, so a failed
//! action leaves the state as it was.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use super::autolabels::{argmax, AutolabelMap};
use super::classes::ClassSet;
use super::data::{Classification, ImageEntry};
use super::library;
use crate::error::{LabelerError, Result};

/// Coarse state of the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No directory loaded, or nothing left to review
    Empty,
    /// The cursor points at a valid image
    Browsing,
}

#[derive(Debug, Default)]
pub struct BrowserState {
    working_dir: Option<PathBuf>,
    images: Vec<ImageEntry>,
    cursor: usize,
    classes: ClassSet,
    autolabels: AutolabelMap,
    has_autolabels: bool,
    subdirectories_loaded: bool,
    /// Recovered problems (malformed sidecars) waiting to be shown to the user
    warnings: Vec<LabelerError>,
}

impl BrowserState {
    /// Open `directory` as the new working directory.
    ///
    /// The class set is taken from the subdirectory names when there are
    /// any, otherwise `classes` is kept. A missing directory opens as empty.
    pub fn open(directory: &Path, classes: ClassSet) -> Result<Self> {
        let subdirectories = library::subdirectory_names(directory)?;
        let classes = if subdirectories.is_empty() {
            classes
        } else {
            ClassSet::new(subdirectories)
        };

        let images = library::scan_images(directory)?;

        let mut warnings = Vec::new();
        let autolabels = match AutolabelMap::load(directory) {
            Ok(map) => map,
            Err(e) => {
                warn!("Ignoring autolabels: {}", e);
                warnings.push(e);
                None
            }
        };

        info!(
            "Opened {} with {} images, {} classes, autolabels: {}",
            directory.display(),
            images.len(),
            classes.len(),
            autolabels.is_some()
        );

        Ok(Self {
            working_dir: Some(directory.to_path_buf()),
            images,
            cursor: 0,
            classes,
            has_autolabels: autolabels.is_some(),
            autolabels: autolabels.unwrap_or_default(),
            subdirectories_loaded: false,
            warnings,
        })
    }

    /// Append the images of every immediate subdirectory and merge their
    /// sidecars into the autolabel map. Returns the number of images added.
    pub fn load_subdirectories(&mut self) -> Result<usize> {
        let Some(working_dir) = self.working_dir.clone() else {
            return Ok(0);
        };
        if self.subdirectories_loaded {
            debug!("Subdirectories of {} already loaded", working_dir.display());
            return Ok(0);
        }

        let mut images = Vec::new();
        let mut labels = Vec::new();
        let mut warnings = Vec::new();
        for subdirectory in library::list_subdirectories(&working_dir)? {
            images.extend(library::scan_images(&subdirectory)?);
            match AutolabelMap::load(&subdirectory) {
                Ok(Some(map)) => labels.push(map),
                Ok(None) => {}
                Err(e) => {
                    warn!("Ignoring autolabels: {}", e);
                    warnings.push(e);
                }
            }
        }

        let added = images.len();
        self.images.extend(images);
        if !labels.is_empty() {
            self.has_autolabels = true;
        }
        for map in labels {
            self.autolabels.merge(map);
        }
        self.warnings.extend(warnings);
        self.subdirectories_loaded = true;

        info!("Loaded {} images from subdirectories", added);
        Ok(added)
    }

    /// Replace the class set. Returns `true` when the set actually changed.
    pub fn set_classes<I, S>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes = ClassSet::new(names);
        if classes == self.classes {
            return false;
        }
        info!("Class set rebuilt: {:?}", classes.names());
        self.classes = classes;
        true
    }

    /// Move the cursor by `delta`, wrapping around both ends
    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.images.len();
        if count == 0 {
            self.cursor = 0;
            return;
        }
        let step = delta.rem_euclid(count as isize) as usize;
        self.cursor = (self.cursor + step) % count;
        debug!("Cursor at {}/{}", self.cursor + 1, count);
    }

    /// File the current image under `class_name`.
    ///
    /// Returns `Ok(None)` when there is nothing to classify.
    pub fn classify(&mut self, class_name: &str) -> Result<Option<Classification>> {
        let (Some(working_dir), Some(image)) = (self.working_dir.as_ref(), self.current()) else {
            return Ok(None);
        };
        library::validate_class_name(class_name)?;

        let class_dir = working_dir.join(class_name);
        let from = image.path().to_path_buf();
        let to = if from.parent() == Some(class_dir.as_path()) {
            from.clone()
        } else {
            library::move_into(&from, &class_dir)
                .inspect_err(|e| warn!("Classify failed: {}", e))?
        };

        self.images.remove(self.cursor);
        if self.cursor >= self.images.len() {
            self.cursor = 0;
        }

        info!("{} -> {}", from.display(), to.display());
        Ok(Some(Classification {
            class_name: class_name.to_string(),
            from,
            to,
        }))
    }

    /// Drop every image already filed under its arg-max class.
    ///
    /// Only runs when every autolabel vector matches the class count.
    /// Returns the number of images removed.
    pub fn autoskip(&mut self) -> usize {
        if !self.autolabels.matches_class_count(self.classes.len()) {
            debug!(
                "Autoskip skipped: autolabels do not match {} classes",
                self.classes.len()
            );
            return 0;
        }

        let before = self.images.len();
        let mut removed_before_cursor = 0;
        let mut kept = Vec::with_capacity(before);
        for (index, image) in std::mem::take(&mut self.images).into_iter().enumerate() {
            if self.is_filed_as_predicted(&image) {
                if index < self.cursor {
                    removed_before_cursor += 1;
                }
            } else {
                kept.push(image);
            }
        }

        self.images = kept;
        let last = self.images.len().saturating_sub(1);
        self.cursor = (self.cursor - removed_before_cursor).min(last);

        let removed = before - self.images.len();
        info!("Autoskip removed {} images", removed);
        removed
    }

    /// The image sits in the directory of the class with the highest confidence
    fn is_filed_as_predicted(&self, image: &ImageEntry) -> bool {
        let Some(class_index) = image
            .folder_name()
            .and_then(|folder| self.classes.index_of(&folder))
        else {
            return false;
        };
        self.autolabels
            .get(&image.filename())
            .and_then(argmax)
            .is_some_and(|predicted| predicted == class_index)
    }

    pub fn phase(&self) -> Phase {
        if self.images.is_empty() {
            Phase::Empty
        } else {
            Phase::Browsing
        }
    }

    pub fn current(&self) -> Option<&ImageEntry> {
        self.images.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    /// Confidences for the current image, only when they line up with the class set
    pub fn confidences(&self) -> Option<&[f32]> {
        let image = self.current()?;
        self.autolabels
            .get(&image.filename())
            .filter(|values| values.len() == self.classes.len())
    }

    pub fn has_autolabels(&self) -> bool {
        self.has_autolabels
    }

    pub fn subdirectories_loaded(&self) -> bool {
        self.subdirectories_loaded
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Drain the recovered problems collected since the last call
    pub fn take_warnings(&mut self) -> Vec<LabelerError> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AUTOLABEL_FILENAME;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn cat_dog() -> ClassSet {
        ClassSet::new(["cat", "dog"])
    }

    fn names(state: &BrowserState) -> Vec<String> {
        state.images().iter().map(ImageEntry::filename).collect()
    }

    #[test]
    fn test_open_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = BrowserState::open(&dir.path().join("missing"), cat_dog()).unwrap();

        assert_eq!(state.phase(), Phase::Empty);
        assert_eq!(state.cursor(), 0);
        assert!(state.current().is_none());
        assert!(!state.has_autolabels());
    }

    #[test]
    fn test_open_takes_classes_from_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("zebra")).unwrap();
        fs::create_dir(dir.path().join("ant")).unwrap();
        touch(&dir.path().join("x.png"));

        let state = BrowserState::open(dir.path(), cat_dog()).unwrap();

        assert_eq!(state.classes().names(), ["ant", "zebra"]);
        assert_eq!(state.phase(), Phase::Browsing);
    }

    #[test]
    fn test_open_keeps_classes_without_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.png"));

        let state = BrowserState::open(dir.path(), cat_dog()).unwrap();

        assert_eq!(state.classes(), &cat_dog());
    }

    #[test]
    fn test_open_recovers_from_malformed_autolabels() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.png"));
        fs::write(dir.path().join(AUTOLABEL_FILENAME), "[1, 2").unwrap();

        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();

        assert!(!state.has_autolabels());
        assert_eq!(state.len(), 1);
        let warnings = state.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], LabelerError::Sidecar { .. }));
        assert!(state.take_warnings().is_empty());
    }

    #[test]
    fn test_move_cursor_wraps_and_reverses() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            touch(&dir.path().join(name));
        }
        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();

        state.move_cursor(-1);
        assert_eq!(state.cursor(), 2);
        state.move_cursor(1);
        assert_eq!(state.cursor(), 0);

        for delta in [1, 2, 5, -4, 100] {
            let start = state.cursor();
            state.move_cursor(delta);
            state.move_cursor(-delta);
            assert_eq!(state.cursor(), start, "delta {}", delta);
        }
    }

    #[test]
    fn test_move_cursor_on_empty() {
        let mut state = BrowserState::default();
        state.move_cursor(3);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_classify_moves_current_image() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.png"));
        touch(&dir.path().join("y.png"));
        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();

        let outcome = state.classify("cat").unwrap().unwrap();

        assert_eq!(names(&state), ["y.png"]);
        assert_eq!(state.cursor(), 0);
        assert_eq!(outcome.to, dir.path().join("cat").join("x.png"));
        assert!(outcome.to.exists());
        assert!(!dir.path().join("x.png").exists());
    }

    #[test]
    fn test_classify_last_image_wraps_cursor() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.png"));
        touch(&dir.path().join("y.png"));
        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();
        state.move_cursor(1);

        state.classify("dog").unwrap();

        assert_eq!(state.cursor(), 0);
        assert_eq!(names(&state), ["x.png"]);
        assert!(dir.path().join("dog").join("y.png").exists());
    }

    #[test]
    fn test_classify_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.png"));
        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();
        touch(&dir.path().join("cat").join("x.png"));

        let err = state.classify("cat").unwrap_err();

        assert!(matches!(err, LabelerError::DestinationExists { .. }));
        assert_eq!(names(&state), ["x.png"]);
        assert!(dir.path().join("x.png").exists());
    }

    #[test]
    fn test_classify_rejects_path_like_class() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.png"));
        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();

        assert!(matches!(
            state.classify("../escape"),
            Err(LabelerError::InvalidClassName(_))
        ));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_classify_without_images_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();

        assert!(state.classify("cat").unwrap().is_none());
        assert!(!dir.path().join("cat").exists());
    }

    #[test]
    fn test_classify_into_own_folder_only_dequeues() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cat").join("x.png"));
        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();
        state.load_subdirectories().unwrap();

        let outcome = state.classify("cat").unwrap().unwrap();

        assert!(outcome.already_filed());
        assert!(state.is_empty());
        assert!(dir.path().join("cat").join("x.png").exists());
    }

    #[test]
    fn test_set_classes_reports_rebuild() {
        let mut state = BrowserState::default();

        assert!(state.set_classes(["a", "", "a", "b"]));
        assert_eq!(state.classes().names(), ["a", "b"]);
        assert!(!state.set_classes(["a", "b", "b"]));
        assert!(state.set_classes(Vec::<String>::new()));
        assert!(state.classes().is_empty());
    }

    #[test]
    fn test_load_subdirectories_merges_autolabels() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("root.png"));
        touch(&dir.path().join("cat").join("x.png"));
        touch(&dir.path().join("dog").join("y.png"));
        fs::write(
            dir.path().join(AUTOLABEL_FILENAME),
            r#"{"x.png": [0.1, 0.9], "root.png": [0.5, 0.5]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("cat").join(AUTOLABEL_FILENAME),
            r#"{"x.png": [0.9, 0.1]}"#,
        )
        .unwrap();

        let mut state = BrowserState::open(dir.path(), ClassSet::default()).unwrap();
        assert_eq!(state.load_subdirectories().unwrap(), 2);

        assert_eq!(names(&state), ["root.png", "x.png", "y.png"]);
        assert_eq!(state.cursor(), 0);
        assert!(state.subdirectories_loaded());
        assert_eq!(state.autolabels.get("x.png"), Some(&[0.9, 0.1][..]));

        assert_eq!(state.load_subdirectories().unwrap(), 0);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_confidences_require_matching_length() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.png"));
        fs::write(
            dir.path().join(AUTOLABEL_FILENAME),
            r#"{"x.png": [0.9, 0.1]}"#,
        )
        .unwrap();

        let mut state = BrowserState::open(dir.path(), cat_dog()).unwrap();
        assert_eq!(state.confidences(), Some(&[0.9, 0.1][..]));

        state.set_classes(["cat", "dog", "bird"]);
        assert!(state.confidences().is_none());
    }

    fn autoskip_fixture(dir: &Path) -> BrowserState {
        touch(&dir.join("cat").join("a.png"));
        touch(&dir.join("cat").join("x.png"));
        touch(&dir.join("dog").join("b.png"));
        touch(&dir.join("dog").join("y.png"));
        fs::write(
            dir.join(AUTOLABEL_FILENAME),
            r#"{"a.png": [0.2, 0.8], "x.png": [0.9, 0.1], "b.png": [0.3, 0.7], "y.png": [0.6, 0.4]}"#,
        )
        .unwrap();

        let mut state = BrowserState::open(dir, ClassSet::default()).unwrap();
        state.load_subdirectories().unwrap();
        state
    }

    #[test]
    fn test_autoskip_removes_correctly_filed_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = autoskip_fixture(dir.path());
        assert_eq!(state.classes().names(), ["cat", "dog"]);
        assert_eq!(names(&state), ["a.png", "x.png", "b.png", "y.png"]);

        assert_eq!(state.autoskip(), 2);
        assert_eq!(names(&state), ["a.png", "y.png"]);
        assert_eq!(state.autoskip(), 0);
    }

    #[test]
    fn test_autoskip_keeps_viewed_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = autoskip_fixture(dir.path());
        state.move_cursor(3);
        assert_eq!(state.current().unwrap().filename(), "y.png");

        state.autoskip();

        assert_eq!(state.current().unwrap().filename(), "y.png");
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn test_autoskip_cursor_on_removed_last_image() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cat").join("x.png"));
        touch(&dir.path().join("dog").join("y.png"));
        fs::write(
            dir.path().join(AUTOLABEL_FILENAME),
            r#"{"x.png": [0.4, 0.6], "y.png": [0.1, 0.9]}"#,
        )
        .unwrap();
        let mut state = BrowserState::open(dir.path(), ClassSet::default()).unwrap();
        state.load_subdirectories().unwrap();
        state.move_cursor(1);

        assert_eq!(state.autoskip(), 1);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.current().unwrap().filename(), "x.png");
    }

    #[test]
    fn test_autoskip_single_image_scenario() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cat").join("x.png"));
        fs::create_dir(dir.path().join("dog")).unwrap();
        fs::write(
            dir.path().join(AUTOLABEL_FILENAME),
            r#"{"x.png": [0.9, 0.1]}"#,
        )
        .unwrap();
        let mut state = BrowserState::open(dir.path(), ClassSet::default()).unwrap();
        state.load_subdirectories().unwrap();

        assert_eq!(state.autoskip(), 1);
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn test_autoskip_noop_on_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = autoskip_fixture(dir.path());
        state.set_classes(["cat", "dog", "bird"]);

        assert_eq!(state.autoskip(), 0);
        assert_eq!(state.len(), 4);
    }
}
