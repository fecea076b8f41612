//! Array merging helpers for skip-paths that select sequence items.
//!
//! A skip-path such as `env[name=DEBUG]` protects destination items that the
//! filtered source no longer contains. These helpers decide which selectors
//! apply at a sequence position and which destination items survive.

use crate::fieldpath::{ArrayFilter, Path, PathElement};
use crate::value::Value;

/// Step is one concrete segment of the position being merged.
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    /// A mapping key.
    Key(&'a str),
    /// A sequence item, identified by its destination value.
    Item(&'a Value),
}

/// Returns true if a skip-path element addresses `step`.
///
/// Index selectors are read-only and never protect anything.
pub fn step_matches(element: &PathElement, step: &Step<'_>) -> bool {
    match (element, step) {
        (PathElement::Key(name), Step::Key(key)) => name == key,
        (PathElement::Wildcard, Step::Item(_)) => true,
        (PathElement::Filter(filter), Step::Item(item)) => filter.matches(item),
        _ => false,
    }
}

/// Returns true if `elements` starts with a prefix that addresses `trail` exactly.
pub fn prefix_matches(elements: &[PathElement], trail: &[Step<'_>]) -> bool {
    elements.len() >= trail.len()
        && elements
            .iter()
            .zip(trail)
            .all(|(element, step)| step_matches(element, step))
}

/// Returns true if some skip-path addresses exactly the position `trail`.
pub fn is_protected(trail: &[Step<'_>], skip_paths: &[Path]) -> bool {
    skip_paths
        .iter()
        .any(|path| path.len() == trail.len() && prefix_matches(path.as_slice(), trail))
}

/// ApplicableSelector is a skip-path selector that applies to the sequence at
/// the current position.
#[derive(Debug, Clone, Copy)]
pub struct ApplicableSelector<'p> {
    /// The wildcard or filter segment.
    pub selector: &'p PathElement,
    /// Segments after the selector, addressing inside each selected item.
    pub remaining: &'p [PathElement],
}

impl<'p> ApplicableSelector<'p> {
    /// Returns true if the selector protects whole items.
    pub fn is_terminal(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Returns the filter, if the selector is one.
    pub fn filter(&self) -> Option<&'p ArrayFilter> {
        self.selector.as_filter()
    }
}

/// Returns the selectors of every skip-path that continues from `trail` with a
/// wildcard or filter segment.
pub fn applicable_selectors<'p>(trail: &[Step<'_>], skip_paths: &'p [Path]) -> Vec<ApplicableSelector<'p>> {
    skip_paths
        .iter()
        .filter_map(|path| {
            let elements = path.as_slice();
            if elements.len() <= trail.len() || !prefix_matches(elements, trail) {
                return None;
            }
            let selector = &elements[trail.len()];
            match selector {
                PathElement::Wildcard | PathElement::Filter(_) => Some(ApplicableSelector {
                    selector,
                    remaining: &elements[trail.len() + 1..],
                }),
                _ => None,
            }
        })
        .collect()
}

/// Returns the first filter that `item` satisfies. Only mappings can match.
pub fn item_matches_any_filter<'f>(item: &Value, filters: &[&'f ArrayFilter]) -> Option<&'f ArrayFilter> {
    if !item.is_map() {
        return None;
    }
    filters.iter().copied().find(|filter| filter.matches(item))
}

/// Finds the item of `target` that corresponds to `source_item`.
///
/// Filters are tried in order; for each, the first target item holding the
/// same value for the filter's property wins.
pub fn find_matching_target_item<'t>(
    source_item: &Value,
    target: &'t [Value],
    filters: &[&ArrayFilter],
) -> Option<(usize, &'t Value)> {
    for filter in filters {
        let Some(wanted) = source_item.get(&filter.property) else {
            continue;
        };
        let found = target
            .iter()
            .enumerate()
            .find(|(_, candidate)| candidate.get(&filter.property) == Some(wanted));
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Returns true if the destination `item` must be carried into the merged array.
///
/// The item must satisfy any one filter, and no item in `existing` may share
/// its values for all of the filters' properties.
pub fn should_preserve_item(item: &Value, filters: &[&ArrayFilter], existing: &[Value]) -> bool {
    if item_matches_any_filter(item, filters).is_none() {
        return false;
    }
    !existing.iter().any(|other| {
        filters
            .iter()
            .all(|filter| other.get(&filter.property) == item.get(&filter.property))
    })
}
