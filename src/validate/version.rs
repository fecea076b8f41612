//! Version string parsing used by the semver and version-format rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static MAJOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v?(\d+)").expect("static pattern"));
static FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)").expect("static pattern"));

/// VPrefix is the policy for a leading `v` in a version string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VPrefix {
    Required,
    #[default]
    Allowed,
    Forbidden,
}

/// Extracts the major version: the leading digits after an optional `v`.
pub fn parse_major(version: &str) -> Option<u64> {
    MAJOR
        .captures(version.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Extracts `(major, minor, patch)` from a version with an optional `v`.
///
/// Anything after the patch number is ignored.
pub fn parse_semver(version: &str) -> Option<(u64, u64, u64)> {
    let caps = FULL.captures(version.trim())?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?))
}

/// VersionFormatError explains why a version is not strict `major.minor.patch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionFormatError {
    #[error("version is empty")]
    Empty,

    #[error("version must start with 'v' (vPrefix: required)")]
    MissingPrefix,

    #[error("version must not start with 'v' (vPrefix: forbidden)")]
    ForbiddenPrefix,

    #[error("version contains a pre-release identifier or build metadata, only major.minor.patch is allowed")]
    PreReleaseOrBuild,

    #[error("version is incomplete: expected major.minor.patch, got only {parts} part(s)")]
    Incomplete { parts: usize },

    #[error("version has too many parts: expected major.minor.patch, got {parts} parts")]
    TooManyParts { parts: usize },

    #[error("version part '{part}' is not numeric")]
    NonNumeric { part: String },

    #[error("version part '{part}' has leading zeros")]
    LeadingZeros { part: String },
}

/// Checks that `version` is exactly `major.minor.patch` under `prefix`.
pub fn check_version_format(version: &str, prefix: VPrefix) -> Result<(), VersionFormatError> {
    if version.is_empty() {
        return Err(VersionFormatError::Empty);
    }

    let has_prefix = version.starts_with('v');
    match prefix {
        VPrefix::Required if !has_prefix => return Err(VersionFormatError::MissingPrefix),
        VPrefix::Forbidden if has_prefix => return Err(VersionFormatError::ForbiddenPrefix),
        _ => {}
    }
    let bare = if has_prefix { &version[1..] } else { version };
    if bare.is_empty() {
        return Err(VersionFormatError::Empty);
    }

    if bare.contains('-') || bare.contains('+') {
        return Err(VersionFormatError::PreReleaseOrBuild);
    }

    let parts: Vec<&str> = bare.split('.').collect();
    if parts.len() < 3 {
        return Err(VersionFormatError::Incomplete { parts: parts.len() });
    }
    if parts.len() > 3 {
        return Err(VersionFormatError::TooManyParts { parts: parts.len() });
    }

    for part in parts {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(VersionFormatError::NonNumeric {
                part: part.to_string(),
            });
        }
        if part.len() > 1 && part.starts_with('0') {
            return Err(VersionFormatError::LeadingZeros {
                part: part.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major() {
        assert_eq!(parse_major("1.2.3"), Some(1));
        assert_eq!(parse_major("v12.0"), Some(12));
        assert_eq!(parse_major("3"), Some(3));
        assert_eq!(parse_major("latest"), None);
    }

    #[test]
    fn test_parse_semver() {
        assert_eq!(parse_semver("1.2.3"), Some((1, 2, 3)));
        assert_eq!(parse_semver("v1.2.3-rc.1"), Some((1, 2, 3)));
        assert_eq!(parse_semver("1.2"), None);
        assert_eq!(parse_semver("latest"), None);
    }

    #[test]
    fn test_version_format_accepts() {
        assert_eq!(check_version_format("0.0.0", VPrefix::Allowed), Ok(()));
        assert_eq!(check_version_format("v1.20.3", VPrefix::Allowed), Ok(()));
        assert_eq!(check_version_format("v1.2.3", VPrefix::Required), Ok(()));
        assert_eq!(check_version_format("10.0.1", VPrefix::Forbidden), Ok(()));
    }

    #[test]
    fn test_version_format_taxonomy() {
        let check = |v| check_version_format(v, VPrefix::Allowed).unwrap_err();

        let err = check("1.2");
        assert_eq!(err, VersionFormatError::Incomplete { parts: 2 });
        assert!(err.to_string().contains("got only 2 part(s)"));

        let err = check("1.2.3.4");
        assert_eq!(err, VersionFormatError::TooManyParts { parts: 4 });
        assert!(err.to_string().contains("got 4 parts"));

        assert!(check("01.2.3").to_string().contains("leading zeros"));
        assert!(check("1.2.3-rc").to_string().contains("pre-release identifier"));
        assert_eq!(check("1.2.3+build"), VersionFormatError::PreReleaseOrBuild);
        assert_eq!(check("1.x.3"), VersionFormatError::NonNumeric { part: "x".into() });
        assert_eq!(check("1..3"), VersionFormatError::NonNumeric { part: "".into() });
        assert_eq!(check(""), VersionFormatError::Empty);
        assert_eq!(check("v"), VersionFormatError::Empty);
    }

    #[test]
    fn test_version_format_prefix_policy() {
        assert_eq!(
            check_version_format("v1.2.3", VPrefix::Forbidden),
            Err(VersionFormatError::ForbiddenPrefix)
        );
        assert_eq!(
            check_version_format("1.2.3", VPrefix::Required),
            Err(VersionFormatError::MissingPrefix)
        );
    }
}
