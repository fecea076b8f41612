//! Fixed values forced into a document after merging.

use crate::fieldpath::{set, Path};
use crate::value::Value;
use tracing::debug;

/// FixedValue overwrites the value at `path` unconditionally.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedValue {
    pub path: Path,
    pub value: Value,
}

impl FixedValue {
    /// Creates a new FixedValue.
    pub fn new(path: Path, value: Value) -> Self {
        FixedValue { path, value }
    }
}

/// Applies `values` to `doc` in order, so that a later value for the same
/// path wins.
///
/// A value whose parent containers do not exist is skipped.
pub fn apply_fixed_values(doc: &mut Value, values: &[&FixedValue]) {
    for fixed in values {
        let written = set(doc, &fixed.path, &fixed.value);
        if written == 0 {
            debug!(path = %fixed.path, "fixed value skipped, parent does not exist");
        }
    }
}
