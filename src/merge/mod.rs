//! Merge module - Folding a filtered source document into its destination.
//!
//! The source is authoritative for everything except the values protected by
//! the file's skip-paths. Fixed values are applied last.

mod array;
mod fixed;
mod merger;

#[cfg(test)]
mod merge_test;

pub use array::*;
pub use fixed::*;
pub use merger::*;
