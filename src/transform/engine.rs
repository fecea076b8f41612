//! Ordered find/replace over strings and documents.

use crate::value::Value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;
use tracing::{trace, warn};

/// TransformRule is a single find/replace pair as written in configuration.
///
/// `replace` may reference capture groups as `$1`, `$<name>`, the whole
/// match as `$&`, and a literal dollar sign as `$$`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRule {
    pub find: String,
    pub replace: String,
}

impl TransformRule {
    /// Creates a new rule.
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        TransformRule {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// CompileMode decides what happens to a pattern that does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// Skip the rule, log a warning and keep going.
    Lenient,
    /// Fail on the first invalid pattern.
    Strict,
}

/// PatternError is returned for an invalid pattern under [`CompileMode::Strict`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid regular expression '{pattern}': {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

/// Compiles a single pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|e| PatternError {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Compiles a list of patterns, dropping or rejecting invalid ones per `mode`.
pub fn compile_patterns<S: AsRef<str>>(
    patterns: &[S],
    mode: CompileMode,
) -> Result<Vec<Regex>, PatternError> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        match compile_pattern(pattern.as_ref()) {
            Ok(regex) => compiled.push(regex),
            Err(e) if mode == CompileMode::Lenient => {
                warn!(pattern = %e.pattern, error = %e.message, "skipping invalid pattern");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(compiled)
}

#[derive(Debug, Clone)]
struct CompiledRule {
    find: Regex,
    replace: String,
}

/// TransformSet is an ordered list of compiled rules.
///
/// Rules apply sequentially: the output of one rule is the input of the next.
#[derive(Debug, Clone, Default)]
pub struct TransformSet {
    rules: Vec<CompiledRule>,
}

impl TransformSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        TransformSet::default()
    }

    /// Compiles rules in order.
    pub fn compile(rules: &[TransformRule], mode: CompileMode) -> Result<Self, PatternError> {
        let mut set = TransformSet::new();
        for rule in rules {
            match compile_pattern(&rule.find) {
                Ok(find) => {
                    let replace = translate_replacement(&rule.replace, find.captures_len());
                    set.rules.push(CompiledRule { find, replace });
                }
                Err(e) if mode == CompileMode::Lenient => {
                    warn!(pattern = %e.pattern, error = %e.message, "skipping invalid transform");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(set)
    }

    /// Builds rules that replace literal text, with no pattern syntax.
    pub fn literal<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let rules = pairs
            .into_iter()
            .filter(|(find, _)| !find.as_ref().is_empty())
            .filter_map(|(find, replace)| {
                Regex::new(&regex::escape(find.as_ref()))
                    .ok()
                    .map(|find| CompiledRule {
                        find,
                        replace: replace.as_ref().replace('$', "$$"),
                    })
            })
            .collect();
        TransformSet { rules }
    }

    /// Places `other`'s rules before this set's rules.
    pub fn prepend(&mut self, other: TransformSet) {
        let mut rules = other.rules;
        rules.append(&mut self.rules);
        self.rules = rules;
    }

    /// Appends `other`'s rules after this set's rules.
    pub fn extend(&mut self, other: TransformSet) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule, in order, replacing all matches.
    pub fn apply(&self, input: &str) -> String {
        let mut current = input.to_string();
        for rule in &self.rules {
            let next = match rule.find.replace_all(&current, rule.replace.as_str()) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            };
            if let Some(next) = next {
                trace!(pattern = rule.find.as_str(), "transform matched");
                current = next;
            }
        }
        current
    }

    /// Applies the rules to every string leaf of a document.
    ///
    /// Keys, numbers, booleans and nulls are left untouched.
    pub fn apply_document(&self, doc: &Value) -> Value {
        if self.is_empty() {
            return doc.clone();
        }
        doc.map_strings(&|s| self.apply(s))
    }
}

/// Applies `rules` to `value` without keeping the compiled set around.
pub fn apply_rules(value: &str, rules: &[TransformRule], mode: CompileMode) -> Result<String, PatternError> {
    Ok(TransformSet::compile(rules, mode)?.apply(value))
}

/// Rewrites a `$1`/`$&`/`$$` style replacement into the regex crate's syntax.
///
/// Group references become `${n}` so that a reference followed by text, as
/// in `$1abc`, still means group 1. A two-digit reference is only used when
/// that group exists. Unknown `$` sequences are kept literally.
fn translate_replacement(replace: &str, captures_len: usize) -> String {
    let chars: Vec<char> = replace.chars().collect();
    let mut out = String::with_capacity(replace.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '$' {
            out.push(c);
            i += 1;
            continue;
        }

        match chars.get(i + 1) {
            Some('$') => {
                out.push_str("$$");
                i += 2;
            }
            Some('&') => {
                out.push_str("${0}");
                i += 2;
            }
            Some(d) if d.is_ascii_digit() => {
                let first = d.to_digit(10).unwrap_or(0) as usize;
                let two_digit = chars
                    .get(i + 2)
                    .and_then(|c| c.to_digit(10))
                    .map(|second| first * 10 + second as usize)
                    .filter(|n| *n > 0 && *n < captures_len);
                if let Some(group) = two_digit {
                    out.push_str(&format!("${{{}}}", group));
                    i += 3;
                } else if first > 0 && first < captures_len {
                    out.push_str(&format!("${{{}}}", first));
                    i += 2;
                } else {
                    out.push_str("$$");
                    i += 1;
                }
            }
            Some('<') => match chars[i + 2..].iter().position(|c| *c == '>') {
                Some(end) => {
                    let name: String = chars[i + 2..i + 2 + end].iter().collect();
                    out.push_str(&format!("${{{}}}", name));
                    i += end + 3;
                }
                None => {
                    out.push_str("$$");
                    i += 1;
                }
            },
            _ => {
                out.push_str("$$");
                i += 1;
            }
        }
    }

    out
}
