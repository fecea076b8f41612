//! Evaluating stop rules against changed files.

use super::rules::{StopRule, StopRuleViolation};
use super::version::{check_version_format, parse_major, parse_semver};
use crate::config::SyncConfig;
use crate::diff::ChangedFile;
use crate::fieldpath::get;
use crate::value::Value;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

/// Path reported by regex rules that scan the whole document.
pub const GLOBAL_SCAN_PATH: &str = "(global scan)";

/// ValidationResult is the outcome of checking every changed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub violations: Vec<StopRuleViolation>,
    pub is_valid: bool,
}

impl ValidationResult {
    fn from_violations(violations: Vec<StopRuleViolation>) -> Self {
        let is_valid = violations.is_empty();
        ValidationResult { violations, is_valid }
    }
}

/// Checks the stop rules that apply to each changed file.
///
/// Added files are never passed here: they have no previous value to
/// compare against. Files without structured content are skipped.
pub fn validate_stop_rules(changed: &[ChangedFile], config: &SyncConfig) -> ValidationResult {
    let mut violations = Vec::new();
    for file in changed {
        let rules = config.stop_rules_for(&file.path);
        if rules.is_empty() {
            continue;
        }
        debug!(file = %file.path, rules = rules.len(), "checking stop rules");
        violations.extend(check_file(file, &rules));
    }
    ValidationResult::from_violations(violations)
}

/// Checks `rules` against a single changed file.
pub fn check_file(file: &ChangedFile, rules: &[&StopRule]) -> Vec<StopRuleViolation> {
    let (Some(updated_doc), Some(old_doc)) = (
        file.processed_source_content.as_ref(),
        file.processed_dest_content.as_ref(),
    ) else {
        return Vec::new();
    };

    rules
        .iter()
        .filter_map(|rule| evaluate(rule, &file.path, old_doc, updated_doc))
        .collect()
}

fn evaluate(rule: &StopRule, file: &str, old_doc: &Value, updated_doc: &Value) -> Option<StopRuleViolation> {
    if let StopRule::Regex {
        path: None, patterns, ..
    } = rule
    {
        return scan_document(rule, file, updated_doc, patterns);
    }

    let path = rule.path()?;
    let old = get(old_doc, path);
    let updated = get(updated_doc, path);
    if old.is_none() && updated.is_none() {
        trace!(file, rule = %rule, "path absent on both sides");
        return None;
    }

    let message = match rule {
        StopRule::SemverMajorUpgrade { .. } => {
            let old_major = parse_major(&old?.to_plain_string()?)?;
            let new_major = parse_major(&updated?.to_plain_string()?)?;
            if new_major <= old_major {
                return None;
            }
            format!(
                "Major version upgrade detected: {} -> {}",
                display(old),
                display(updated)
            )
        }
        StopRule::SemverDowngrade { .. } => {
            let old_version = parse_semver(&old?.to_plain_string()?)?;
            let new_version = parse_semver(&updated?.to_plain_string()?)?;
            if new_version >= old_version {
                return None;
            }
            format!(
                "Version downgrade detected: {} -> {}",
                display(old),
                display(updated)
            )
        }
        StopRule::Numeric { min, max, .. } => {
            let number = updated.or(old)?.as_number()?;
            match (min, max) {
                (Some(min), _) if number < *min => {
                    format!("Value {} is below minimum {}", number, min)
                }
                (_, Some(max)) if number > *max => {
                    format!("Value {} is above maximum {}", number, max)
                }
                _ => return None,
            }
        }
        StopRule::VersionFormat { v_prefix, .. } => {
            let version = updated?.to_plain_string()?;
            let err = check_version_format(&version, *v_prefix).err()?;
            format!("Invalid version format '{}': {}", version, err)
        }
        StopRule::Regex { patterns, .. } => {
            let text = updated.or(old)?.to_plain_string()?;
            let pattern = patterns.iter().find(|p| p.is_match(&text))?;
            format!("Value '{}' matches forbidden pattern '{}'", text, pattern.as_str())
        }
    };

    Some(StopRuleViolation {
        file: file.to_string(),
        rule: rule.kind().to_string(),
        path: path.to_string(),
        old_value: old.cloned(),
        updated_value: updated.cloned(),
        message,
    })
}

/// Scans every scalar of the updated document, stopping at the first match.
fn scan_document(rule: &StopRule, file: &str, doc: &Value, patterns: &[Regex]) -> Option<StopRuleViolation> {
    let mut hit: Option<(String, &Regex)> = None;
    doc.walk_leaves(&mut |leaf| {
        if leaf.is_null() {
            return true;
        }
        let Some(text) = leaf.to_plain_string() else {
            return true;
        };
        match patterns.iter().find(|p| p.is_match(&text)) {
            Some(pattern) => {
                hit = Some((text, pattern));
                false
            }
            None => true,
        }
    });

    let (text, pattern) = hit?;
    Some(StopRuleViolation {
        file: file.to_string(),
        rule: rule.kind().to_string(),
        path: GLOBAL_SCAN_PATH.to_string(),
        old_value: None,
        updated_value: Some(Value::String(text.clone())),
        message: format!(
            "Value '{}' matches forbidden pattern '{}'",
            text,
            pattern.as_str()
        ),
    })
}

fn display(value: Option<&Value>) -> String {
    value
        .and_then(Value::to_plain_string)
        .unwrap_or_else(|| "undefined".to_string())
}
