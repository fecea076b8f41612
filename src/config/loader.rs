//! Loading configuration files and the pattern/transform files they reference.

use super::schema::{ConfigFile, StopRuleEntry};
use super::{SyncConfig, SyncConfigBuilder};
use crate::fieldpath::{parse_path, PathError};
use crate::transform::{compile_patterns, CompileMode, PatternError, TransformSet};
use crate::validate::{PatternSource, StopRule};
use crate::value::{from_yaml, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// ConfigError is returned when configuration cannot be loaded or compiled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Yaml {
        origin: String,
        source: serde_yaml::Error,
    },

    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: globset::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("{}: {source}", .file.display())]
    Pattern {
        file: PathBuf,
        source: PatternError,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads and compiles a configuration file.
///
/// Relative paths inside the file resolve against the file's directory.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SyncConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    load(&contents, &path.display().to_string(), base_dir)
}

/// Loads and compiles configuration text, resolving relative paths against `base_dir`.
pub fn load_from_str(input: &str, base_dir: impl AsRef<Path>) -> Result<SyncConfig, ConfigError> {
    load(input, "configuration", base_dir.as_ref())
}

fn load(input: &str, origin: &str, base_dir: &Path) -> Result<SyncConfig, ConfigError> {
    let file: ConfigFile = serde_yaml::from_str(input).map_err(|source| ConfigError::Yaml {
        origin: origin.to_string(),
        source,
    })?;
    compile(file, base_dir)
}

fn compile(file: ConfigFile, base_dir: &Path) -> Result<SyncConfig, ConfigError> {
    let mut builder: SyncConfigBuilder = SyncConfig::builder()
        .source(base_dir.join(&file.source))
        .destination(base_dir.join(&file.destination))
        .include(file.include.as_slice())
        .exclude(file.exclude.as_slice())
        .prune(file.prune);

    for (glob, paths) in &file.skip_path {
        builder = builder.skip_path(glob, paths.as_slice());
    }

    for (glob, entry) in &file.transforms {
        let mut content = TransformSet::compile(&entry.content, CompileMode::Lenient)?;
        for extra in entry.content_file.files().iter().rev() {
            content.prepend(load_literal_transforms(&base_dir.join(extra))?);
        }
        let mut filename = TransformSet::compile(&entry.filename, CompileMode::Lenient)?;
        for extra in entry.filename_file.files().iter().rev() {
            filename.prepend(load_literal_transforms(&base_dir.join(extra))?);
        }
        debug!(glob = %glob, content = content.len(), filename = filename.len(), "compiled transforms");
        builder = builder.transforms(glob, content, filename);
    }

    for (glob, entries) in &file.stop_rules {
        let rules = entries
            .iter()
            .map(|entry| compile_stop_rule(entry, base_dir))
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.stop_rules(glob, rules);
    }

    for (glob, entries) in &file.fixed_values {
        for entry in entries {
            builder = builder.fixed_value(glob, &entry.path, entry.value.clone());
        }
    }

    builder.build()
}

impl From<PatternError> for ConfigError {
    fn from(source: PatternError) -> Self {
        ConfigError::Pattern {
            file: PathBuf::from("<inline>"),
            source,
        }
    }
}

fn compile_stop_rule(entry: &StopRuleEntry, base_dir: &Path) -> Result<StopRule, ConfigError> {
    let optional_path = |path: &Option<String>| path.as_deref().map(parse_path).transpose();

    let rule = match entry {
        StopRuleEntry::SemverMajorUpgrade { path } => StopRule::SemverMajorUpgrade {
            path: parse_path(path)?,
        },
        StopRuleEntry::SemverDowngrade { path } => StopRule::SemverDowngrade {
            path: parse_path(path)?,
        },
        StopRuleEntry::Numeric { path, min, max } => {
            if min.is_none() && max.is_none() {
                return Err(ConfigError::Invalid(format!(
                    "numeric stop rule for '{}' needs at least one of min or max",
                    path
                )));
            }
            if let (Some(lo), Some(hi)) = (min, max) {
                if lo > hi {
                    return Err(ConfigError::Invalid(format!(
                        "numeric stop rule for '{}' has min {} greater than max {}",
                        path, lo, hi
                    )));
                }
            }
            StopRule::Numeric {
                path: parse_path(path)?,
                min: *min,
                max: *max,
            }
        }
        StopRuleEntry::Regex { path, regex } => StopRule::regex(optional_path(path)?, regex)?,
        StopRuleEntry::RegexFile { path, file } => {
            let file = base_dir.join(file);
            let patterns = read_pattern_list(&file)?;
            StopRule::Regex {
                path: optional_path(path)?,
                patterns: compile_file_patterns(&patterns, &file)?,
                source: PatternSource::File(file),
            }
        }
        StopRuleEntry::RegexFileKey { path, file } => {
            let file = base_dir.join(file);
            let patterns = read_pattern_keys(&file)?;
            StopRule::Regex {
                path: optional_path(path)?,
                patterns: compile_file_patterns(&patterns, &file)?,
                source: PatternSource::FileKeys(file),
            }
        }
        StopRuleEntry::VersionFormat { path, v_prefix } => StopRule::VersionFormat {
            path: parse_path(path)?,
            v_prefix: *v_prefix,
        },
    };
    Ok(rule)
}

fn compile_file_patterns(patterns: &[String], file: &Path) -> Result<Vec<regex::Regex>, ConfigError> {
    compile_patterns(patterns, CompileMode::Strict).map_err(|source| ConfigError::Pattern {
        file: file.to_path_buf(),
        source,
    })
}

fn read_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_yaml(&contents).map_err(|source| ConfigError::Yaml {
        origin: path.display().to_string(),
        source,
    })
}

/// Reads a YAML list of patterns. Non-string entries are coerced to text.
fn read_pattern_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    match read_yaml_file(path)? {
        Value::Null => Ok(Vec::new()),
        Value::List(items) => items
            .iter()
            .map(|item| {
                item.to_plain_string().ok_or_else(|| {
                    ConfigError::Invalid(format!("{}: patterns must be scalars", path.display()))
                })
            })
            .collect(),
        other => Err(ConfigError::Invalid(format!(
            "{}: expected a list of patterns, got a {}",
            path.display(),
            other.type_name()
        ))),
    }
}

/// Reads the keys of a YAML mapping as patterns.
fn read_pattern_keys(path: &Path) -> Result<Vec<String>, ConfigError> {
    match read_yaml_file(path)? {
        Value::Null => Ok(Vec::new()),
        Value::Map(map) => Ok(map.keys().cloned().collect()),
        other => Err(ConfigError::Invalid(format!(
            "{}: expected a mapping whose keys are patterns, got a {}",
            path.display(),
            other.type_name()
        ))),
    }
}

/// Reads a YAML mapping of literal `find: replace` pairs.
fn load_literal_transforms(path: &Path) -> Result<TransformSet, ConfigError> {
    let map = match read_yaml_file(path)? {
        Value::Null => return Ok(TransformSet::new()),
        Value::Map(map) => map,
        other => {
            return Err(ConfigError::Invalid(format!(
                "{}: expected a mapping of find/replace pairs, got a {}",
                path.display(),
                other.type_name()
            )))
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (find, replace) in map.iter() {
        let replace = replace.to_plain_string().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "{}: replacement for '{}' must be a scalar",
                path.display(),
                find
            ))
        })?;
        pairs.push((find.clone(), replace));
    }
    debug!(file = %path.display(), rules = pairs.len(), "loaded literal transforms");
    Ok(TransformSet::literal(pairs))
}
