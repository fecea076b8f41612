//! Field path module - Addressing values inside documents.
//!
//! Paths are dotted key chains with optional bracket suffixes that select
//! sequence items: `[*]`, `[0]`, `[prop=value]`, `[prop^=value]`,
//! `[prop$=value]` and `[prop*=value]`.

mod access;
mod parse;
mod path;

pub use access::*;
pub use parse::*;
pub use path::*;
