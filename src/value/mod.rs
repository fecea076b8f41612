//! Value module - In-memory representation of YAML documents.
//!
//! This module provides the document tree every other stage operates on.

mod value;

pub use value::*;
