//! Gitignore-style glob matching for relative file paths.

use globset::{Glob, GlobBuilder, GlobMatcher};
use std::fmt;

/// GlobPattern matches relative, `/`-separated file paths.
///
/// `*` and `?` never cross a `/`, `**` does. A pattern without any `/`
/// matches at every depth, so `*.yaml` matches `apps/web/values.yaml`.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    matcher: GlobMatcher,
}

impl GlobPattern {
    /// Compiles a pattern.
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        let trimmed = pattern.trim_start_matches("./");
        let anchored = trimmed.strip_prefix('/');
        let effective = match anchored {
            Some(rest) => rest.to_string(),
            None if !trimmed.contains('/') => format!("**/{}", trimmed),
            None => trimmed.to_string(),
        };
        let glob: Glob = GlobBuilder::new(&effective)
            .literal_separator(true)
            .backslash_escape(true)
            .build()?;
        Ok(GlobPattern {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the relative path matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path.trim_start_matches("./"))
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

/// Returns true if `path` matches the glob `pattern`.
///
/// Invalid patterns never match.
pub fn matches(path: &str, pattern: &str) -> bool {
    GlobPattern::new(pattern)
        .map(|glob| glob.is_match(path))
        .unwrap_or(false)
}
