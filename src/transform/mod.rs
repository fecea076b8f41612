//! Transform module - Regex find/replace over values and file names.
//!
//! Content transforms rewrite every string leaf of a source document,
//! filename transforms rewrite relative paths. Patterns are compiled once,
//! either leniently (invalid rules are skipped) or strictly.

mod engine;

pub use engine::*;
