//! Turning a diff into the writes and deletions that bring the destination
//! in line with the source.

use crate::config::SyncConfig;
use crate::diff::{is_yaml_file, parse_document, ChangedFile, DiffResult, FileSet};
use crate::error::{BatchError, Side, SyncError};
use crate::merge::{apply_fixed_values, merge_documents};
use crate::value::to_yaml;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// SyncPlan lists the destination files to write and remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// New file contents keyed by relative path.
    pub writes: BTreeMap<String, Vec<u8>>,
    /// Relative paths to remove.
    pub deletes: Vec<String>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.deletes.is_empty()
    }

    /// Writes and removes files under `root`, creating parent directories.
    pub fn apply(&self, root: &Path) -> io::Result<()> {
        for (path, content) in &self.writes {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)?;
            debug!(file = %path, "wrote");
        }
        for path in &self.deletes {
            match fs::remove_file(root.join(path)) {
                Ok(()) => debug!(file = %path, "removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        info!(written = self.writes.len(), removed = self.deletes.len(), "destination updated");
        Ok(())
    }
}

/// Builds the plan for `diff`.
///
/// `source` supplies the content of added files. Per-file failures are
/// collected and returned together.
pub fn plan(diff: &DiffResult, source: &FileSet, config: &SyncConfig) -> Result<SyncPlan, BatchError> {
    let mut plan = SyncPlan::default();
    let mut errors = BatchError::new();

    for path in &diff.added_files {
        let Some(bytes) = source.get_bytes(path) else {
            continue;
        };
        match render_added(path, bytes, config) {
            Ok(content) => {
                plan.writes.insert(path.clone(), content);
            }
            Err(err) => errors.add(err),
        }
    }

    for changed in &diff.changed_files {
        match render_changed(changed, config) {
            Ok(Some(content)) => {
                plan.writes.insert(changed.path.clone(), content);
            }
            Ok(None) => {}
            Err(err) => errors.add(err),
        }
    }

    if config.prune() {
        plan.deletes = diff.deleted_files.clone();
    }

    errors.into_result(plan)
}

fn render_added(path: &str, bytes: &[u8], config: &SyncConfig) -> Result<Vec<u8>, SyncError> {
    if !is_yaml_file(path) {
        return Ok(bytes.to_vec());
    }
    let doc = parse_document(path, Side::Source, bytes)?;
    let mut doc = config.content_transforms_for(path).apply_document(&doc);
    apply_fixed_values(&mut doc, &config.fixed_values_for(path));
    to_yaml(&doc).map(String::into_bytes).map_err(|e| SyncError::merge(path, e))
}

fn render_changed(changed: &ChangedFile, config: &SyncConfig) -> Result<Option<Vec<u8>>, SyncError> {
    let path = changed.path.as_str();
    let Some(source) = changed.raw_parsed_source.as_ref() else {
        return Ok(changed.source_content.clone());
    };

    let dest_bytes = changed.destination_content.as_deref().unwrap_or_default();
    let dest = parse_document(path, Side::Destination, dest_bytes)?;

    let skip_paths = config.skip_paths_for(path);
    let mut merged = merge_documents(&dest, source, &skip_paths);
    apply_fixed_values(&mut merged, &config.fixed_values_for(path));
    to_yaml(&merged)
        .map(|text| Some(text.into_bytes()))
        .map_err(|e| SyncError::merge(path, e))
}
