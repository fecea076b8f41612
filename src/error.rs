//! Error types for the diff, merge and plan stages.

use crate::transform::PatternError;
use std::fmt;
use thiserror::Error;

/// Side identifies which tree a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Destination => write!(f, "destination"),
        }
    }
}

/// SyncError is a failure while processing a single file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("{path}: failed to parse {side} YAML: {message}")]
    Parse {
        path: String,
        side: Side,
        message: String,
    },

    #[error("{path}: merge failed: {message}")]
    Merge { path: String, message: String },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl SyncError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<String>, side: Side, err: impl fmt::Display) -> Self {
        SyncError::Parse {
            path: path.into(),
            side,
            message: err.to_string(),
        }
    }

    /// Creates a merge error.
    pub fn merge(path: impl Into<String>, err: impl fmt::Display) -> Self {
        SyncError::Merge {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Returns the file the error belongs to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            SyncError::Parse { path, .. } | SyncError::Merge { path, .. } => Some(path),
            SyncError::Pattern(_) => None,
        }
    }

    /// Returns advisory text on how to fix the error.
    pub fn hint(&self) -> &'static str {
        match self {
            SyncError::Parse { .. } => "validate the YAML syntax of the file (indentation, quoting, unclosed brackets)",
            SyncError::Merge { .. } => "check skipPath and fixedValues entries for this file's glob pattern",
            SyncError::Pattern(_) => "check the regular expression syntax in the referenced pattern",
        }
    }
}

/// BatchError collects per-file errors so that one bad file does not stop
/// the others from being processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchError {
    errors: Vec<SyncError>,
}

impl BatchError {
    /// Creates a new empty BatchError.
    pub fn new() -> Self {
        BatchError { errors: Vec::new() }
    }

    /// Adds an error.
    pub fn add(&mut self, error: SyncError) {
        self.errors.push(error);
    }

    /// Returns true if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns an iterator over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &SyncError> {
        self.errors.iter()
    }

    /// Returns `Ok(value)` when no errors were collected, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, BatchError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for BatchError {
    type Item = SyncError;
    type IntoIter = std::vec::IntoIter<SyncError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} file(s) failed to process:", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  - {}\n    hint: {}", err, err.hint())?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::parse("apps/values.yaml", Side::Destination, "did not find expected key");
        let text = err.to_string();
        assert!(text.contains("apps/values.yaml"));
        assert!(text.contains("destination"));
        assert_eq!(err.path(), Some("apps/values.yaml"));
    }

    #[test]
    fn test_batch_error_collects() {
        let mut batch = BatchError::new();
        assert!(batch.is_empty());
        assert_eq!(batch.clone().into_result(1), Ok(1));

        batch.add(SyncError::parse("a.yaml", Side::Source, "bad"));
        batch.add(SyncError::merge("b.yaml", "boom"));
        assert_eq!(batch.len(), 2);

        let text = batch.to_string();
        assert!(text.starts_with("2 file(s) failed"));
        assert!(text.contains("hint: validate the YAML syntax"));
        assert!(batch.into_result(()).is_err());
    }
}
