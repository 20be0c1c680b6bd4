/// The ordered set of class names
///
/// Each name is one destination subdirectory and one button. Names are
/// trimmed, blanks are dropped and duplicates keep their first position.
use crate::config::DEFAULT_CLASSES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSet {
    names: Vec<String>,
}

impl Default for ClassSet {
    fn default() -> Self {
        Self::new(DEFAULT_CLASSES)
    }
}

impl ClassSet {
    /// Build a normalised class set from arbitrary names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalised: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || normalised.iter().any(|existing| existing == name) {
                continue;
            }
            normalised.push(name.to_string());
        }
        Self { names: normalised }
    }

    /// Parse the class editor's newline-separated text
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Format for the class editor, one name per line
    pub fn to_text(&self) -> String {
        self.names.join("\n")
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|existing| existing == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
