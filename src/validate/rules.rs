//! Stop rule definitions and violations.

use super::version::VPrefix;
use crate::fieldpath::Path;
use crate::transform::{compile_pattern, PatternError};
use crate::value::Value;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// PatternSource records where a regex rule's patterns came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// A single inline `regex`.
    Inline,
    /// A YAML list of patterns.
    File(PathBuf),
    /// The keys of a YAML mapping.
    FileKeys(PathBuf),
}

/// StopRule is a validation gate evaluated against changed files.
#[derive(Debug, Clone)]
pub enum StopRule {
    /// Blocks an increase of the major version.
    SemverMajorUpgrade { path: Path },
    /// Blocks any decrease of `(major, minor, patch)`.
    SemverDowngrade { path: Path },
    /// Blocks values outside `[min, max]`.
    Numeric {
        path: Path,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Blocks values matching any of the patterns. Without a path every
    /// scalar of the document is scanned.
    Regex {
        path: Option<Path>,
        patterns: Vec<Regex>,
        source: PatternSource,
    },
    /// Requires a strict `major.minor.patch` version.
    VersionFormat { path: Path, v_prefix: VPrefix },
}

impl StopRule {
    /// Creates an inline regex rule, compiling the pattern strictly.
    pub fn regex(path: Option<Path>, pattern: &str) -> Result<Self, PatternError> {
        Ok(StopRule::Regex {
            path,
            patterns: vec![compile_pattern(pattern)?],
            source: PatternSource::Inline,
        })
    }

    /// Returns the rule's type name as written in configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            StopRule::SemverMajorUpgrade { .. } => "semverMajorUpgrade",
            StopRule::SemverDowngrade { .. } => "semverDowngrade",
            StopRule::Numeric { .. } => "numeric",
            StopRule::Regex { source, .. } => match source {
                PatternSource::Inline => "regex",
                PatternSource::File(_) => "regexFile",
                PatternSource::FileKeys(_) => "regexFileKey",
            },
            StopRule::VersionFormat { .. } => "versionFormat",
        }
    }

    /// Returns the addressed path, if the rule has one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            StopRule::SemverMajorUpgrade { path }
            | StopRule::SemverDowngrade { path }
            | StopRule::Numeric { path, .. }
            | StopRule::VersionFormat { path, .. } => Some(path),
            StopRule::Regex { path, .. } => path.as_ref(),
        }
    }
}

impl fmt::Display for StopRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}({})", self.kind(), path),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// StopRuleViolation is a finding reported for a changed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRuleViolation {
    pub file: String,
    pub rule: String,
    pub path: String,
    pub old_value: Option<Value>,
    pub updated_value: Option<Value>,
    pub message: String,
}

impl fmt::Display for StopRuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} at {}]: {}", self.file, self.rule, self.path, self.message)
    }
}
