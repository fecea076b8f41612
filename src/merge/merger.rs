//! Deep merging of a filtered source document into a destination document.

use super::array::{
    applicable_selectors, find_matching_target_item, is_protected, item_matches_any_filter,
    should_preserve_item, ApplicableSelector, Step,
};
use crate::fieldpath::{ArrayFilter, Path, PathElement};
use crate::value::{Map, Value};
use tracing::{debug, trace};

/// DeepMerger merges documents while keeping what skip-paths protect.
///
/// The source is authoritative: destination keys it lacks are deleted,
/// unless a skip-path addresses them, and arrays are replaced wholesale
/// unless a skip-path selects items inside them.
#[derive(Debug, Clone, Copy)]
pub struct DeepMerger<'p> {
    skip_paths: &'p [Path],
}

impl<'p> DeepMerger<'p> {
    /// Creates a merger for a file with the given skip-paths.
    pub fn new(skip_paths: &'p [Path]) -> Self {
        DeepMerger { skip_paths }
    }

    /// Merges `source`, already stripped of its skip-paths, into `dest`.
    pub fn merge(&self, dest: &Value, source: &Value) -> Value {
        let mut trail = Vec::new();
        self.merge_value(dest, source, &mut trail)
    }

    fn merge_value<'a>(&self, dest: &'a Value, source: &'a Value, trail: &mut Vec<Step<'a>>) -> Value {
        match (dest, source) {
            (Value::Map(dest_map), Value::Map(source_map)) => {
                Value::Map(self.merge_mapping(dest_map, source_map, trail))
            }
            (Value::List(dest_items), Value::List(source_items)) => {
                Value::List(self.merge_sequence(dest_items, source_items, trail))
            }
            _ => source.clone(),
        }
    }

    fn merge_mapping<'a>(&self, dest: &'a Map, source: &'a Map, trail: &mut Vec<Step<'a>>) -> Map {
        let mut result = Map::new();

        // Destination order is kept for keys on both sides.
        for (key, dest_value) in dest.iter() {
            trail.push(Step::Key(key));
            match source.get(key) {
                Some(source_value) => {
                    let merged = self.merge_value(dest_value, source_value, trail);
                    result.set(key.clone(), merged);
                }
                None if is_protected(trail, self.skip_paths) => {
                    trace!(key = %key, "keeping protected destination key");
                    result.set(key.clone(), dest_value.clone());
                }
                None => {
                    debug!(key = %key, "deleting key absent from source");
                }
            }
            trail.pop();
        }

        for (key, source_value) in source.iter() {
            if !dest.has(key) {
                result.set(key.clone(), source_value.clone());
            }
        }
        result
    }

    fn merge_sequence<'a>(&self, dest: &'a [Value], source: &'a [Value], trail: &mut Vec<Step<'a>>) -> Vec<Value> {
        let selectors = applicable_selectors(trail, self.skip_paths);
        if selectors.is_empty() {
            return source.to_vec();
        }

        // A whole-array wildcard keeps the destination array untouched.
        if selectors
            .iter()
            .any(|s| s.is_terminal() && matches!(s.selector, PathElement::Wildcard))
        {
            return dest.to_vec();
        }

        let nested: Vec<&ApplicableSelector<'_>> = selectors.iter().filter(|s| !s.is_terminal()).collect();
        let mut result: Vec<Value> = source
            .iter()
            .enumerate()
            .map(|(index, item)| match counterpart(index, item, dest, &nested) {
                Some(dest_item) => {
                    trail.push(Step::Item(dest_item));
                    let merged = self.merge_value(dest_item, item, trail);
                    trail.pop();
                    merged
                }
                None => item.clone(),
            })
            .collect();

        let terminal: Vec<&ArrayFilter> = selectors
            .iter()
            .filter(|s| s.is_terminal())
            .filter_map(|s| s.filter())
            .collect();
        if !terminal.is_empty() {
            for item in dest {
                if should_preserve_item(item, &terminal, &result) {
                    trace!(item = ?item.get(&terminal[0].property), "keeping protected array item");
                    result.push(item.clone());
                }
            }
        }
        result
    }
}

/// Finds the destination item that `item` (at `index` in the source) pairs
/// with for a nested selector.
fn counterpart<'a>(
    index: usize,
    item: &Value,
    dest: &'a [Value],
    nested: &[&ApplicableSelector<'_>],
) -> Option<&'a Value> {
    for selector in nested {
        match selector.selector {
            PathElement::Wildcard => {
                if let Some(found) = dest.get(index) {
                    return Some(found);
                }
            }
            PathElement::Filter(filter) => {
                let filters = [filter];
                if item_matches_any_filter(item, &filters).is_none() {
                    continue;
                }
                if let Some((_, found)) = find_matching_target_item(item, dest, &filters) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

/// Merges `source` into `dest`, keeping the values `skip_paths` protect.
pub fn merge_documents(dest: &Value, source: &Value, skip_paths: &[Path]) -> Value {
    DeepMerger::new(skip_paths).merge(dest, source)
}
