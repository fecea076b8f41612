//! Diff module - Structural comparison of source and destination trees.
//!
//! YAML files are compared as documents after the source's content transforms
//! are applied and skip-paths are removed from both sides, so formatting, key
//! order and protected values never register as changes.

mod differ;
mod result;


pub use differ::*;
pub use result::*;
