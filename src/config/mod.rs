//! Config module - Synchronization settings compiled once per run.
//!
//! [`SyncConfig`] holds every glob, path and pattern already compiled, and
//! answers "which rules apply to this file" for the diff, validate and merge
//! stages. It is built either with [`SyncConfigBuilder`] or by loading a YAML
//! file with [`load_from_path`].

mod loader;
mod schema;

pub use loader::*;
pub use schema::*;

use crate::fieldpath::{parse_path, Path, PathError};
use crate::glob::GlobPattern;
use crate::merge::FixedValue;
use crate::transform::TransformSet;
use crate::validate::StopRule;
use crate::value::Value;
use std::path::{Path as FsPath, PathBuf};

/// SkipPathRule associates a file glob with paths excluded from comparison
/// and preserved from the destination on merge.
#[derive(Debug, Clone)]
pub struct SkipPathRule {
    pub glob: GlobPattern,
    pub paths: Vec<Path>,
}

#[derive(Debug, Clone)]
struct TransformGroup {
    glob: GlobPattern,
    content: TransformSet,
    filename: TransformSet,
}

#[derive(Debug, Clone)]
struct StopRuleGroup {
    glob: GlobPattern,
    rules: Vec<StopRule>,
}

#[derive(Debug, Clone)]
struct FixedValueGroup {
    glob: GlobPattern,
    values: Vec<FixedValue>,
}

/// SyncConfig is the compiled configuration of a synchronization run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    source: PathBuf,
    destination: PathBuf,
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
    prune: bool,
    skip_path: Vec<SkipPathRule>,
    transforms: Vec<TransformGroup>,
    stop_rules: Vec<StopRuleGroup>,
    fixed_values: Vec<FixedValueGroup>,
}

impl SyncConfig {
    /// Creates a new SyncConfigBuilder.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::new()
    }

    /// Returns the source directory.
    pub fn source(&self) -> &FsPath {
        &self.source
    }

    /// Returns the destination directory.
    pub fn destination(&self) -> &FsPath {
        &self.destination
    }

    /// Returns true if destination-only files are reported and removed.
    pub fn prune(&self) -> bool {
        self.prune
    }

    /// Returns true if the relative path passes the include and exclude globs.
    pub fn is_included(&self, path: &str) -> bool {
        self.include.iter().any(|g| g.is_match(path)) && !self.exclude.iter().any(|g| g.is_match(path))
    }

    /// Returns the skip-paths of every rule whose glob matches `file`.
    pub fn skip_paths_for(&self, file: &str) -> Vec<Path> {
        self.skip_path
            .iter()
            .filter(|rule| rule.glob.is_match(file))
            .flat_map(|rule| rule.paths.iter().cloned())
            .collect()
    }

    /// Returns the content transforms that apply to `file`, in declaration order.
    pub fn content_transforms_for(&self, file: &str) -> TransformSet {
        let mut set = TransformSet::new();
        for entry in self.transforms.iter().filter(|e| e.glob.is_match(file)) {
            set.extend(entry.content.clone());
        }
        set
    }

    /// Returns the filename transforms that apply to `file`, in declaration order.
    pub fn filename_transforms_for(&self, file: &str) -> TransformSet {
        let mut set = TransformSet::new();
        for entry in self.transforms.iter().filter(|e| e.glob.is_match(file)) {
            set.extend(entry.filename.clone());
        }
        set
    }

    /// Returns the stop rules that apply to `file`.
    pub fn stop_rules_for(&self, file: &str) -> Vec<&StopRule> {
        self.stop_rules
            .iter()
            .filter(|e| e.glob.is_match(file))
            .flat_map(|e| e.rules.iter())
            .collect()
    }

    /// Returns the fixed values that apply to `file`, in declaration order.
    pub fn fixed_values_for(&self, file: &str) -> Vec<&FixedValue> {
        self.fixed_values
            .iter()
            .filter(|e| e.glob.is_match(file))
            .flat_map(|e| e.values.iter())
            .collect()
    }
}

/// SyncConfigBuilder is a builder for creating a SyncConfig.
///
/// Globs and paths are kept as text until [`build`](Self::build) compiles them.
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    source: PathBuf,
    destination: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    prune: bool,
    skip_path: Vec<(String, Vec<String>)>,
    transforms: Vec<(String, TransformSet, TransformSet)>,
    stop_rules: Vec<(String, Vec<StopRule>)>,
    fixed_values: Vec<(String, Vec<(String, Value)>)>,
}

impl SyncConfigBuilder {
    /// Creates a new SyncConfigBuilder.
    pub fn new() -> Self {
        SyncConfigBuilder::default()
    }

    /// Sets the source directory.
    pub fn source(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source = dir.into();
        self
    }

    /// Sets the destination directory.
    pub fn destination(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination = dir.into();
        self
    }

    /// Adds include globs. Without any, every file is included.
    pub fn include<S: AsRef<str>>(mut self, globs: &[S]) -> Self {
        self.include.extend(globs.iter().map(|g| g.as_ref().to_string()));
        self
    }

    /// Adds exclude globs.
    pub fn exclude<S: AsRef<str>>(mut self, globs: &[S]) -> Self {
        self.exclude.extend(globs.iter().map(|g| g.as_ref().to_string()));
        self
    }

    /// Sets whether destination-only files are pruned.
    pub fn prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Adds skip-paths for files matching `glob`.
    pub fn skip_path<S: AsRef<str>>(mut self, glob: &str, paths: &[S]) -> Self {
        self.skip_path.push((
            glob.to_string(),
            paths.iter().map(|p| p.as_ref().to_string()).collect(),
        ));
        self
    }

    /// Adds content and filename transforms for files matching `glob`.
    pub fn transforms(mut self, glob: &str, content: TransformSet, filename: TransformSet) -> Self {
        self.transforms.push((glob.to_string(), content, filename));
        self
    }

    /// Adds stop rules for files matching `glob`.
    pub fn stop_rules(mut self, glob: &str, rules: Vec<StopRule>) -> Self {
        self.stop_rules.push((glob.to_string(), rules));
        self
    }

    /// Adds a fixed value for files matching `glob`.
    pub fn fixed_value(mut self, glob: &str, path: &str, value: impl Into<Value>) -> Self {
        let entry = (path.to_string(), value.into());
        let same_glob = self
            .fixed_values
            .last()
            .map(|(last, _)| last.as_str() == glob)
            .unwrap_or(false);
        match self.fixed_values.last_mut() {
            Some((_, values)) if same_glob => values.push(entry),
            _ => self.fixed_values.push((glob.to_string(), vec![entry])),
        }
        self
    }

    /// Compiles globs and paths into a SyncConfig.
    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        let include = if self.include.is_empty() {
            vec![compile_glob("**/*")?]
        } else {
            compile_globs(&self.include)?
        };

        let mut skip_path = Vec::with_capacity(self.skip_path.len());
        for (glob, paths) in &self.skip_path {
            skip_path.push(SkipPathRule {
                glob: compile_glob(glob)?,
                paths: paths
                    .iter()
                    .map(|p| parse_path(p))
                    .collect::<Result<Vec<_>, PathError>>()?,
            });
        }

        let mut transforms = Vec::with_capacity(self.transforms.len());
        for (glob, content, filename) in self.transforms {
            transforms.push(TransformGroup {
                glob: compile_glob(&glob)?,
                content,
                filename,
            });
        }

        let mut stop_rules = Vec::with_capacity(self.stop_rules.len());
        for (glob, rules) in self.stop_rules {
            stop_rules.push(StopRuleGroup {
                glob: compile_glob(&glob)?,
                rules,
            });
        }

        let mut fixed_values = Vec::with_capacity(self.fixed_values.len());
        for (glob, values) in self.fixed_values {
            let mut compiled = Vec::with_capacity(values.len());
            for (path, value) in values {
                compiled.push(FixedValue::new(parse_path(&path)?, value));
            }
            fixed_values.push(FixedValueGroup {
                glob: compile_glob(&glob)?,
                values: compiled,
            });
        }

        Ok(SyncConfig {
            source: self.source,
            destination: self.destination,
            include,
            exclude: compile_globs(&self.exclude)?,
            prune: self.prune,
            skip_path,
            transforms,
            stop_rules,
            fixed_values,
        })
    }
}

fn compile_glob(pattern: &str) -> Result<GlobPattern, ConfigError> {
    GlobPattern::new(pattern).map_err(|source| ConfigError::Glob {
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_globs(patterns: &[String]) -> Result<Vec<GlobPattern>, ConfigError> {
    patterns.iter().map(|p| compile_glob(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{CompileMode, TransformRule};

    #[test]
    fn test_rules_for_matching_globs() {
        let config = SyncConfig::builder()
            .skip_path("*.yaml", &["image.pullPolicy"])
            .skip_path("apps/web/*.yaml", &["env[name=DEBUG]"])
            .skip_path("*.json", &["ignored"])
            .build()
            .unwrap();

        let paths: Vec<String> = config
            .skip_paths_for("apps/web/values.yaml")
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(paths, vec!["image.pullPolicy", "env[name=DEBUG]"]);
        assert_eq!(config.skip_paths_for("other/values.yaml").len(), 1);
    }

    #[test]
    fn test_transforms_concatenate_in_order() {
        let first = TransformSet::compile(&[TransformRule::new("uat", "stage")], CompileMode::Strict).unwrap();
        let second = TransformSet::compile(&[TransformRule::new("stage", "prod")], CompileMode::Strict).unwrap();
        let config = SyncConfig::builder()
            .transforms("**/*.yaml", first, TransformSet::new())
            .transforms("*.yaml", second, TransformSet::new())
            .build()
            .unwrap();
        assert_eq!(config.content_transforms_for("a/b.yaml").apply("uat"), "prod");
        assert!(config.filename_transforms_for("a/b.yaml").is_empty());
        assert!(config.content_transforms_for("a/b.txt").is_empty());
    }

    #[test]
    fn test_include_exclude() {
        let config = SyncConfig::builder()
            .exclude(&["secrets/**"])
            .build()
            .unwrap();
        assert!(config.is_included("apps/values.yaml"));
        assert!(!config.is_included("secrets/db.yaml"));

        let config = SyncConfig::builder().include(&["*.yaml"]).build().unwrap();
        assert!(!config.is_included("README.md"));
    }

    #[test]
    fn test_fixed_values_keep_declared_order() {
        let config = SyncConfig::builder()
            .fixed_value("*.yaml", "replicas", 1i64)
            .fixed_value("*.yaml", "replicas", 2i64)
            .build()
            .unwrap();
        let values: Vec<&Value> = config.fixed_values_for("x.yaml").iter().map(|f| &f.value).collect();
        assert_eq!(values, vec![&Value::Int(1), &Value::Int(2)]);
    }

    #[test]
    fn test_build_rejects_bad_input() {
        assert!(matches!(
            SyncConfig::builder().skip_path("a[", &["x"]).build(),
            Err(ConfigError::Glob { .. })
        ));
        assert!(matches!(
            SyncConfig::builder().skip_path("*.yaml", &["a..b"]).build(),
            Err(ConfigError::Path(_))
        ));
    }
}
