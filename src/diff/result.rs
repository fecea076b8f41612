//! Inputs and outputs of the diff stage.

use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// FileSet is a collection of files keyed by relative path.
///
/// Contents are raw bytes so that binary files travel through unchanged.
/// Paths are in destination shape: when a filename transform renamed a file,
/// the key is the new path and [`original_path`](Self::original_path)
/// returns the path it was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: BTreeMap<String, Vec<u8>>,
    original_paths: BTreeMap<String, String>,
}

impl FileSet {
    /// Creates a new empty FileSet.
    pub fn new() -> Self {
        FileSet::default()
    }

    /// Adds a file.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Adds a file that was renamed from `original`.
    pub fn insert_renamed(
        &mut self,
        path: impl Into<String>,
        original: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) {
        let path = path.into();
        let original = original.into();
        if original != path {
            self.original_paths.insert(path.clone(), original);
        }
        self.files.insert(path, content.into());
    }

    /// Returns the content of a file as text, or `None` when the file is
    /// missing or not valid UTF-8.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.get_bytes(path).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Returns the raw content of a file.
    pub fn get_bytes(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Returns true if the file exists.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Returns the path a renamed file was read from.
    pub fn original_path(&self, path: &str) -> Option<&str> {
        self.original_paths.get(path).map(String::as_str)
    }

    /// Iterates over files in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    /// Iterates over paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<P: Into<String>, C: Into<Vec<u8>>> FromIterator<(P, C)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut set = FileSet::new();
        for (path, content) in iter {
            set.insert(path, content);
        }
        set
    }
}

/// ChangedFile describes a file that differs between source and destination.
///
/// The structured fields are only populated for YAML files. `raw_parsed_*`
/// hold the documents after content transforms and skip-path removal, the
/// `processed_*` fields their normalized form used for comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
    #[serde(skip)]
    pub source_content: Option<Vec<u8>>,
    #[serde(skip)]
    pub destination_content: Option<Vec<u8>>,
    #[serde(skip)]
    pub raw_parsed_source: Option<Value>,
    #[serde(skip)]
    pub raw_parsed_dest: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_source_content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_dest_content: Option<Value>,
    pub skip_paths: Vec<String>,
}

impl ChangedFile {
    /// Returns true if the file was compared structurally.
    pub fn is_structured(&self) -> bool {
        self.processed_source_content.is_some() && self.processed_dest_content.is_some()
    }
}

/// DiffResult sorts every file into exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub added_files: Vec<String>,
    pub deleted_files: Vec<String>,
    pub changed_files: Vec<ChangedFile>,
    pub unchanged_files: Vec<String>,
}

impl DiffResult {
    /// Returns true if nothing needs to be written or removed.
    pub fn is_empty(&self) -> bool {
        self.added_files.is_empty() && self.deleted_files.is_empty() && self.changed_files.is_empty()
    }

    /// Returns the changed file with the given path.
    pub fn changed(&self, path: &str) -> Option<&ChangedFile> {
        self.changed_files.iter().find(|f| f.path == path)
    }
}
