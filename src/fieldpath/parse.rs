//! Parsing of dotted path expressions.
//!
//! Grammar, informally:
//!
//! ```text
//! path     := ["$" ["."]] segment ("." segment | bracket)*
//! segment  := key bracket*
//! bracket  := "[*]" | "[" digits "]" | "[" property op value "]"
//! op       := "=" | "^=" | "$=" | "*="
//! ```
//!
//! Filter values may contain dots and may be wrapped in single or double quotes.

use super::path::{FilterOperator, Path, PathElement};
use std::str::FromStr;
use thiserror::Error;

/// PathError is returned for malformed path expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path '{path}': {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl PathError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        PathError {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Parses a path expression.
pub fn parse_path(input: &str) -> Result<Path, PathError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("$.")
        .or_else(|| trimmed.strip_prefix('$'))
        .unwrap_or(trimmed);

    if body.is_empty() {
        return Err(PathError::new(input, "path is empty"));
    }

    let mut elements = Vec::new();
    let mut chars = body.char_indices().peekable();
    let mut key = String::new();
    // True right after a '.', where a key must follow.
    let mut expect_key = true;

    while let Some((pos, c)) = chars.next() {
        match c {
            '.' => {
                if expect_key && key.is_empty() {
                    return Err(PathError::new(input, format!("empty segment at offset {}", pos)));
                }
                if !key.is_empty() {
                    elements.push(PathElement::Key(std::mem::take(&mut key)));
                }
                expect_key = true;
            }
            '[' => {
                if !key.is_empty() {
                    elements.push(PathElement::Key(std::mem::take(&mut key)));
                } else if expect_key && !elements.is_empty() {
                    return Err(PathError::new(input, format!("empty segment at offset {}", pos)));
                }
                let mut inner = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(PathError::new(input, "unterminated '['"));
                }
                elements.push(parse_bracket(input, &inner)?);
                expect_key = false;
                if let Some(&(next_pos, next)) = chars.peek() {
                    if next != '.' && next != '[' {
                        return Err(PathError::new(
                            input,
                            format!("expected '.' or '[' at offset {}", next_pos),
                        ));
                    }
                }
            }
            ']' => {
                return Err(PathError::new(input, format!("unexpected ']' at offset {}", pos)));
            }
            other => {
                key.push(other);
                expect_key = false;
            }
        }
    }

    if !key.is_empty() {
        elements.push(PathElement::Key(key));
    } else if expect_key {
        return Err(PathError::new(input, "path ends with '.'"));
    }

    Ok(Path::from_elements(elements))
}

fn parse_bracket(input: &str, inner: &str) -> Result<PathElement, PathError> {
    let inner = inner.trim();
    if inner == "*" {
        return Ok(PathElement::Wildcard);
    }
    if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
        let index = inner
            .parse::<usize>()
            .map_err(|e| PathError::new(input, format!("invalid index: {}", e)))?;
        return Ok(PathElement::Index(index));
    }

    let eq = inner
        .find('=')
        .ok_or_else(|| PathError::new(input, format!("unsupported bracket expression '[{}]'", inner)))?;
    let (head, value) = (&inner[..eq], &inner[eq + 1..]);
    let (property, operator) = match head.chars().last() {
        Some('^') => (&head[..head.len() - 1], FilterOperator::StartsWith),
        Some('$') => (&head[..head.len() - 1], FilterOperator::EndsWith),
        Some('*') => (&head[..head.len() - 1], FilterOperator::Contains),
        _ => (head, FilterOperator::Equals),
    };
    let property = property.trim();
    if property.is_empty() {
        return Err(PathError::new(input, format!("filter '[{}]' has no property", inner)));
    }

    Ok(PathElement::filter(property, operator, unquote(value.trim())))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}
