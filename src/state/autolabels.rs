/// Autolabel sidecar handling
///
/// `autolabels.json` maps an image filename (no path component) to a list of
/// per-class confidences, aligned positionally with the class set. The file
/// is produced by an external labeling process and is never written here.
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::AUTOLABEL_FILENAME;
use crate::error::{LabelerError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AutolabelMap {
    entries: HashMap<String, Vec<f32>>,
}

impl AutolabelMap {
    /// Load `directory/autolabels.json`.
    ///
    /// Returns `Ok(None)` when the file does not exist and
    /// `LabelerError::Sidecar` when it exists but does not parse.
    pub fn load(directory: &Path) -> Result<Option<Self>> {
        let path = directory.join(AUTOLABEL_FILENAME);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LabelerError::io(path, e)),
        };

        let map = Self::from_json(&json).map_err(|source| LabelerError::Sidecar {
            path: path.clone(),
            source,
        })?;
        log::debug!("Loaded {} autolabels from {}", map.len(), path.display());
        Ok(Some(map))
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Merge `other` into `self`; on a filename collision the later map wins
    pub fn merge(&mut self, other: AutolabelMap) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, filename: &str) -> Option<&[f32]> {
        self.entries.get(filename).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the map is non-empty and every vector has `class_count` entries
    pub fn matches_class_count(&self, class_count: usize) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .values()
                .all(|values| values.len() == class_count)
    }
}

/// Index of the highest confidence; the first one wins on ties
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ if value.is_nan() => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
