//! Path element and path types.

use crate::value::Value;
use std::fmt;

/// FilterOperator is the comparison used by an array filter segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `[prop=value]`
    Equals,
    /// `[prop^=value]`
    StartsWith,
    /// `[prop$=value]`
    EndsWith,
    /// `[prop*=value]`
    Contains,
}

impl FilterOperator {
    /// Returns the operator as written inside brackets.
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::StartsWith => "^=",
            FilterOperator::EndsWith => "$=",
            FilterOperator::Contains => "*=",
        }
    }

    fn test(&self, candidate: &str, expected: &str) -> bool {
        match self {
            FilterOperator::Equals => candidate == expected,
            FilterOperator::StartsWith => candidate.starts_with(expected),
            FilterOperator::EndsWith => candidate.ends_with(expected),
            FilterOperator::Contains => candidate.contains(expected),
        }
    }
}

/// ArrayFilter selects sequence items by comparing one of their properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayFilter {
    pub property: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl ArrayFilter {
    /// Creates a new filter.
    pub fn new(property: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        ArrayFilter {
            property: property.into(),
            operator,
            value: value.into(),
        }
    }

    /// Returns true if `item` is a mapping whose property matches the filter.
    ///
    /// The property is coerced to a string before comparison. Items without
    /// the property, or whose property is not a scalar, never match.
    pub fn matches(&self, item: &Value) -> bool {
        item.get(&self.property)
            .and_then(Value::to_plain_string)
            .map(|candidate| self.operator.test(&candidate, &self.value))
            .unwrap_or(false)
    }
}

impl fmt::Display for ArrayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.property, self.operator.symbol(), self.value)
    }
}

/// PathElement represents one level of path navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// Mapping key.
    Key(String),
    /// `[*]`, every item of a sequence.
    Wildcard,
    /// `[n]`, a sequence position. Only used for reads.
    Index(usize),
    /// `[prop=value]` and friends, the sequence items matching a predicate.
    Filter(ArrayFilter),
}

impl PathElement {
    /// Creates a new key path element.
    pub fn key(name: impl Into<String>) -> Self {
        PathElement::Key(name.into())
    }

    /// Creates a new filter path element.
    pub fn filter(property: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        PathElement::Filter(ArrayFilter::new(property, operator, value))
    }

    /// Returns true if this is a key element.
    pub fn is_key(&self) -> bool {
        matches!(self, PathElement::Key(_))
    }

    /// Returns the key name if this is a key element.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathElement::Key(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the filter if this is a filter element.
    pub fn as_filter(&self) -> Option<&ArrayFilter> {
        match self {
            PathElement::Filter(filter) => Some(filter),
            _ => None,
        }
    }

    /// Returns true if the element addresses sequence items rather than a key.
    pub fn is_array_selector(&self) -> bool {
        !self.is_key()
    }
}

/// Path is a parsed path expression such as `spec.env[name=DEBUG].value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Path {
            elements: Vec::new(),
        }
    }

    /// Creates a path from a vector of elements.
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Path { elements }
    }

    /// Returns the number of elements in the path.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the path elements.
    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.elements.iter()
    }

    /// Appends a path element.
    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// Returns the last path element.
    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// Returns a slice of the path elements.
    pub fn as_slice(&self) -> &[PathElement] {
        &self.elements
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Key(name) => write!(f, "{}", name),
            PathElement::Wildcard => write!(f, "[*]"),
            PathElement::Index(i) => write!(f, "[{}]", i),
            PathElement::Filter(filter) => write!(f, "[{}]", filter),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 && element.is_key() {
                write!(f, ".")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_yaml;

    #[test]
    fn test_path_display() {
        let path = Path::from_elements(vec![
            PathElement::key("spec"),
            PathElement::key("env"),
            PathElement::filter("name", FilterOperator::StartsWith, "DEBUG"),
            PathElement::key("value"),
        ]);
        assert_eq!(path.to_string(), "spec.env[name^=DEBUG].value");

        let path = Path::from_elements(vec![PathElement::key("items"), PathElement::Wildcard]);
        assert_eq!(path.to_string(), "items[*]");
    }

    #[test]
    fn test_filter_operators() {
        let item = from_yaml("name: feature-flag\n").unwrap();
        assert!(ArrayFilter::new("name", FilterOperator::Equals, "feature-flag").matches(&item));
        assert!(ArrayFilter::new("name", FilterOperator::StartsWith, "feature").matches(&item));
        assert!(ArrayFilter::new("name", FilterOperator::EndsWith, "flag").matches(&item));
        assert!(ArrayFilter::new("name", FilterOperator::Contains, "re-fl").matches(&item));
        assert!(!ArrayFilter::new("name", FilterOperator::Equals, "feature").matches(&item));
    }

    #[test]
    fn test_filter_coerces_and_requires_property() {
        let item = from_yaml("port: 8080\n").unwrap();
        assert!(ArrayFilter::new("port", FilterOperator::Equals, "8080").matches(&item));
        assert!(!ArrayFilter::new("name", FilterOperator::Equals, "8080").matches(&item));
        assert!(!ArrayFilter::new("port", FilterOperator::Equals, "8080").matches(&Value::from("8080")));
    }
}
