use std::path::{Path, PathBuf};

/// Sub-path streamed when the caller does not name one.
pub const DEFAULT_SUB_PATH: &str = "entities";

/// A file plus the dotted key path of the array to stream from it.
///
/// An empty `sub_path` streams the elements of a root-level array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub path: PathBuf,
    pub sub_path: String,
}

impl Source {
    /// Stream the conventional `entities` array of `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sub_path: DEFAULT_SUB_PATH.to_string(),
        }
    }

    /// Stream a document whose root is the array itself.
    pub fn root_array(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sub_path: String::new(),
        }
    }

    #[must_use]
    pub fn with_sub_path(mut self, sub_path: impl Into<String>) -> Self {
        self.sub_path = sub_path.into();
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys leading from the document root to the streamed array.
    #[must_use]
    pub fn sub_path_keys(&self) -> Vec<String> {
        let trimmed = self.sub_path.trim();
        let trimmed = trimmed
            .strip_prefix("$.")
            .or_else(|| trimmed.strip_prefix('$'))
            .unwrap_or(trimmed);
        trimmed
            .split('.')
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_path_keys_split_on_dots() {
        assert_eq!(Source::new("f.json").sub_path_keys(), vec!["entities"]);
        assert_eq!(
            Source::new("f.json").with_sub_path("$.data.items").sub_path_keys(),
            vec!["data", "items"]
        );
        assert!(Source::root_array("f.json").sub_path_keys().is_empty());
    }
}
