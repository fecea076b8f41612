//! Classifying files as added, deleted, changed or unchanged.

use super::result::{ChangedFile, DiffResult, FileSet};
use crate::config::SyncConfig;
use crate::error::{BatchError, Side, SyncError};
use crate::fieldpath::{delete_in_place, Path};
use crate::value::{from_yaml, Value};
use tracing::{debug, trace};

/// Returns true if the path has a `.yaml` or `.yml` extension, in any case.
pub fn is_yaml_file(path: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Removes every skip-path from a copy of `doc`.
pub fn strip_skip_paths(doc: &Value, skip_paths: &[Path]) -> Value {
    let mut copy = doc.clone();
    for path in skip_paths {
        delete_in_place(&mut copy, path);
    }
    copy
}

/// Compares `source` against `destination`.
///
/// Every file is attempted; parse failures are collected and returned
/// together once all files have been classified.
pub fn compute_diff(source: &FileSet, destination: &FileSet, config: &SyncConfig) -> Result<DiffResult, BatchError> {
    let mut result = DiffResult::default();
    let mut errors = BatchError::new();

    for (path, source_bytes) in source.iter() {
        let Some(dest_bytes) = destination.get_bytes(path) else {
            trace!(file = path, "added");
            result.added_files.push(path.to_string());
            continue;
        };

        let compared = if is_yaml_file(path) {
            compare_yaml(path, source_bytes, dest_bytes, config)
        } else {
            Ok(compare_bytes(path, source_bytes, dest_bytes))
        };

        match compared {
            Ok(None) => result.unchanged_files.push(path.to_string()),
            Ok(Some(mut changed)) => {
                changed.original_path = source.original_path(path).map(str::to_string);
                result.changed_files.push(changed);
            }
            Err(err) => errors.add(err),
        }
    }

    if config.prune() {
        result.deleted_files = destination
            .paths()
            .filter(|path| !source.contains(path))
            .map(str::to_string)
            .collect();
    }

    debug!(
        added = result.added_files.len(),
        deleted = result.deleted_files.len(),
        changed = result.changed_files.len(),
        unchanged = result.unchanged_files.len(),
        "diff computed"
    );
    errors.into_result(result)
}

fn compare_bytes(path: &str, source: &[u8], dest: &[u8]) -> Option<ChangedFile> {
    if source == dest {
        return None;
    }
    Some(ChangedFile {
        path: path.to_string(),
        source_content: Some(source.to_vec()),
        destination_content: Some(dest.to_vec()),
        ..Default::default()
    })
}

/// Parses YAML file content, reporting invalid UTF-8 as a parse error.
pub fn parse_document(path: &str, side: Side, bytes: &[u8]) -> Result<Value, SyncError> {
    let text = std::str::from_utf8(bytes).map_err(|e| SyncError::parse(path, side, e))?;
    from_yaml(text).map_err(|e| SyncError::parse(path, side, e))
}

fn compare_yaml(path: &str, source_bytes: &[u8], dest_bytes: &[u8], config: &SyncConfig) -> Result<Option<ChangedFile>, SyncError> {
    let source_doc = parse_document(path, Side::Source, source_bytes)?;
    let dest_doc = parse_document(path, Side::Destination, dest_bytes)?;

    let source_doc = config.content_transforms_for(path).apply_document(&source_doc);
    let skip_paths = config.skip_paths_for(path);
    let raw_source = strip_skip_paths(&source_doc, &skip_paths);
    let raw_dest = strip_skip_paths(&dest_doc, &skip_paths);

    let processed_source = raw_source.normalized();
    let processed_dest = raw_dest.normalized();
    if processed_source == processed_dest {
        return Ok(None);
    }

    Ok(Some(ChangedFile {
        path: path.to_string(),
        original_path: None,
        source_content: Some(source_bytes.to_vec()),
        destination_content: Some(dest_bytes.to_vec()),
        raw_parsed_source: Some(raw_source),
        raw_parsed_dest: Some(raw_dest),
        processed_source_content: Some(processed_source),
        processed_dest_content: Some(processed_dest),
        skip_paths: skip_paths.iter().map(|p| p.to_string()).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yaml_file() {
        assert!(is_yaml_file("values.yaml"));
        assert!(is_yaml_file("apps/web/Values.YML"));
        assert!(!is_yaml_file("README.md"));
        assert!(!is_yaml_file("yaml"));
        assert!(!is_yaml_file("values.yaml.bak"));
    }

    #[test]
    fn test_compare_bytes() {
        assert_eq!(compare_bytes("logo.png", &[0x89, 0xff], &[0x89, 0xff]), None);
        let changed = compare_bytes("logo.png", &[0x89, 0xff], &[0x89, 0xfe]).unwrap();
        assert_eq!(changed.source_content, Some(vec![0x89, 0xff]));
        assert!(!changed.is_structured());
    }

    #[test]
    fn test_parse_document_rejects_invalid_utf8() {
        let err = parse_document("values.yaml", Side::Destination, &[b'a', b':', b' ', 0xff]).unwrap_err();
        assert_eq!(err.path(), Some("values.yaml"));
        assert!(matches!(err, SyncError::Parse { side: Side::Destination, .. }));
    }
}
