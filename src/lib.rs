//! # env-delta
//!
//! Environment-aware synchronization of YAML configuration trees.
//!
//! This library compares a source environment (for example `uat/`) with a
//! destination environment (for example `prod/`) structurally, rewrites
//! environment-specific strings, refuses dangerous changes and merges the
//! source into the destination while keeping protected values in place.
//!
//! ## Modules
//!
//! - [`value`] - In-memory YAML documents with order-independent comparison
//! - [`fieldpath`] - Path expressions such as `env[name=DEBUG].value` and access by path
//! - [`glob`] - Gitignore-style matching of relative file paths
//! - [`transform`] - Ordered regex find/replace rules for content and file names
//! - [`diff`] - Classification of files into added, deleted, changed and unchanged
//! - [`merge`] - Deep merge honouring skip-paths, array filters and fixed values
//! - [`validate`] - Stop rules that gate a run on dangerous changes
//! - [`config`] - Configuration file loading and compilation
//! - [`files`] - Reading directory trees into file sets
//! - [`sync`] - Turning a diff into destination writes and deletions

pub mod config;
pub mod diff;
pub mod error;
pub mod fieldpath;
pub mod files;
pub mod glob;
pub mod logging;
pub mod merge;
pub mod sync;
pub mod transform;
pub mod validate;
pub mod value;

pub use config::{load_from_path, ConfigError, SyncConfig, SyncConfigBuilder};
pub use diff::{compute_diff, ChangedFile, DiffResult, FileSet};
pub use error::{BatchError, SyncError};
pub use fieldpath::{parse_path, Path, PathElement};
pub use merge::{merge_documents, FixedValue};
pub use sync::{plan, SyncPlan};
pub use transform::{TransformRule, TransformSet};
pub use validate::{validate_stop_rules, StopRule, StopRuleViolation, ValidationResult};
pub use value::Value;
