//! On-disk configuration format.

use crate::transform::TransformRule;
use crate::validate::VPrefix;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::PathBuf;

fn default_include() -> Vec<String> {
    vec!["**/*".to_string()]
}

/// ConfigFile mirrors the YAML configuration file.
///
/// Map-valued sections keep their declaration order, which decides the
/// order transforms and fixed values are applied in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub prune: bool,
    #[serde(default)]
    pub skip_path: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub transforms: IndexMap<String, TransformsEntry>,
    #[serde(default)]
    pub stop_rules: IndexMap<String, Vec<StopRuleEntry>>,
    #[serde(default)]
    pub fixed_values: IndexMap<String, Vec<FixedValueEntry>>,
}

/// TransformsEntry holds the transforms declared for one glob.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransformsEntry {
    #[serde(default)]
    pub content: Vec<TransformRule>,
    #[serde(default)]
    pub filename: Vec<TransformRule>,
    /// YAML files of literal `find: replace` pairs, run before `content`.
    #[serde(default)]
    pub content_file: FileList,
    /// YAML files of literal `find: replace` pairs, run before `filename`.
    #[serde(default)]
    pub filename_file: FileList,
}

/// FileList accepts either a single file or a list of files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FileList {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl Default for FileList {
    fn default() -> Self {
        FileList::Many(Vec::new())
    }
}

impl FileList {
    /// Returns the files as a slice.
    pub fn files(&self) -> &[PathBuf] {
        match self {
            FileList::One(file) => std::slice::from_ref(file),
            FileList::Many(files) => files,
        }
    }
}

/// StopRuleEntry is a stop rule as written in configuration, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StopRuleEntry {
    SemverMajorUpgrade {
        path: String,
    },
    SemverDowngrade {
        path: String,
    },
    Numeric {
        path: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Regex {
        #[serde(default)]
        path: Option<String>,
        regex: String,
    },
    RegexFile {
        #[serde(default)]
        path: Option<String>,
        file: PathBuf,
    },
    RegexFileKey {
        #[serde(default)]
        path: Option<String>,
        file: PathBuf,
    },
    VersionFormat {
        path: String,
        #[serde(default, rename = "vPrefix")]
        v_prefix: VPrefix,
    },
}

/// FixedValueEntry forces `path` to `value` after merging.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedValueEntry {
    pub path: String,
    pub value: Value,
}
