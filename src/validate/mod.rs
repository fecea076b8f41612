//! Validate module - Stop rules that gate a synchronization run.
//!
//! Stop rules compare the previous (destination) and updated (source) value at
//! a path of each changed file and report a [`StopRuleViolation`] when a change
//! looks dangerous. Violations are data; the caller decides whether to abort.

mod engine;
mod rules;
mod version;


pub use engine::*;
pub use rules::*;
pub use version::*;
