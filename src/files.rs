//! Reading a directory tree into a [`FileSet`].

use crate::config::SyncConfig;
use crate::diff::FileSet;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Reads every included file under `root`.
///
/// Paths are relative to `root` and `/`-separated. With
/// `apply_filename_transforms` set, each file is keyed by its transformed
/// path and the original is recorded as a rename. Include, exclude and
/// transform globs match the path as found on disk. Contents are read as
/// bytes, so binary files are collected like any other. A missing root
/// yields an empty set.
pub fn collect(root: &Path, config: &SyncConfig, apply_filename_transforms: bool) -> io::Result<FileSet> {
    let mut files = FileSet::new();
    if !root.exists() {
        debug!(root = %root.display(), "directory does not exist");
        return Ok(files);
    }

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(relative) = relative_path(root, entry.path()) else {
            continue;
        };
        if !config.is_included(&relative) {
            trace!(file = %relative, "excluded");
            continue;
        }

        let content = fs::read(entry.path())?;
        if apply_filename_transforms {
            let renamed = config.filename_transforms_for(&relative).apply(&relative);
            if renamed != relative {
                debug!(from = %relative, to = %renamed, "renamed");
            }
            files.insert_renamed(renamed, relative, content);
        } else {
            files.insert(relative, content);
        }
    }

    debug!(root = %root.display(), files = files.len(), "collected");
    Ok(files)
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{CompileMode, TransformRule, TransformSet};
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: impl AsRef<[u8]>) {
        let target = root.join(path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, content).unwrap();
    }

    #[test]
    fn test_collect_applies_globs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "apps/web/values.yaml", "a: 1");
        write(dir.path(), "apps/web/secrets.yaml", "s: 1");
        write(dir.path(), "README.md", "readme");

        let config = SyncConfig::builder()
            .include(&["**/*.yaml"])
            .exclude(&["secrets.yaml"])
            .build()
            .unwrap();
        let files = collect(dir.path(), &config, false).unwrap();
        assert_eq!(files.paths().collect::<Vec<_>>(), vec!["apps/web/values.yaml"]);
        assert_eq!(files.get("apps/web/values.yaml"), Some("a: 1"));
    }

    #[test]
    fn test_collect_renames() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "uat/values-uat.yaml", "a: 1");
        write(dir.path(), "uat/other.yaml", "b: 1");

        let filename = TransformSet::compile(&[TransformRule::new("-uat\\.", "-prod.")], CompileMode::Lenient).unwrap();
        let config = SyncConfig::builder()
            .transforms("uat/*.yaml", TransformSet::new(), filename)
            .build()
            .unwrap();

        let files = collect(dir.path(), &config, true).unwrap();
        assert!(files.contains("uat/values-prod.yaml"));
        assert_eq!(files.original_path("uat/values-prod.yaml"), Some("uat/values-uat.yaml"));
        assert_eq!(files.original_path("uat/other.yaml"), None);

        let untouched = collect(dir.path(), &config, false).unwrap();
        assert!(untouched.contains("uat/values-uat.yaml"));
    }

    #[test]
    fn test_collect_binary_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "chart/values.yaml", "a: 1");
        write(dir.path(), "chart/logo.png", [0x89u8, 0x50, 0xff, 0xfe, 0x00]);

        let config = SyncConfig::builder().build().unwrap();
        let files = collect(dir.path(), &config, false).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files.get_bytes("chart/logo.png"), Some(&[0x89, 0x50, 0xff, 0xfe, 0x00][..]));
        assert_eq!(files.get("chart/values.yaml"), Some("a: 1"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = SyncConfig::builder().build().unwrap();
        assert!(collect(&dir.path().join("nope"), &config, false).unwrap().is_empty());
    }
}
