//! Reading, deleting and overwriting values addressed by a [`Path`].
//!
//! Navigation never fails: a segment that does not fit the value it is
//! applied to (a key on a sequence, a filter on a mapping, a missing key)
//! simply ends the walk.

use super::path::{Path, PathElement};
use crate::value::Value;

/// Returns the value addressed by `path`, or `None` if it does not exist.
///
/// Filter segments resolve to the first matching item. Wildcards cannot be
/// resolved to a single value and always yield `None`.
pub fn get<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = doc;
    for element in path {
        current = match (element, current) {
            (PathElement::Key(name), Value::Map(map)) => map.get(name)?,
            (PathElement::Index(i), Value::List(items)) => items.get(*i)?,
            (PathElement::Filter(filter), Value::List(items)) => {
                items.iter().find(|item| filter.matches(item))?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Returns a copy of `doc` with the value(s) addressed by `path` removed.
pub fn delete(doc: &Value, path: &Path) -> Value {
    let mut copy = doc.clone();
    delete_in_place(&mut copy, path);
    copy
}

/// Removes the value(s) addressed by `path` from `doc`.
///
/// At the terminal segment a key is removed from its mapping, `[*]` empties
/// the sequence and a filter removes the matching items. Index segments are
/// read-only and make the whole operation a no-op.
pub fn delete_in_place(doc: &mut Value, path: &Path) {
    delete_elements(doc, path.as_slice());
}

fn delete_elements(value: &mut Value, elements: &[PathElement]) {
    let Some((head, rest)) = elements.split_first() else {
        return;
    };

    if rest.is_empty() {
        match (head, value) {
            (PathElement::Key(name), Value::Map(map)) => {
                map.delete(name);
            }
            (PathElement::Wildcard, Value::List(items)) => items.clear(),
            (PathElement::Filter(filter), Value::List(items)) => {
                items.retain(|item| !filter.matches(item));
            }
            _ => {}
        }
        return;
    }

    match (head, value) {
        (PathElement::Key(name), Value::Map(map)) => {
            if let Some(child) = map.get_mut(name) {
                delete_elements(child, rest);
            }
        }
        (PathElement::Wildcard, Value::List(items)) => {
            for item in items.iter_mut() {
                delete_elements(item, rest);
            }
        }
        (PathElement::Filter(filter), Value::List(items)) => {
            for item in items.iter_mut().filter(|item| filter.matches(item)) {
                delete_elements(item, rest);
            }
        }
        _ => {}
    }
}

/// Overwrites the value(s) addressed by `path` with `new_value`.
///
/// A missing terminal key is created inside its existing parent mapping, but
/// missing intermediate containers are never created: if the parent chain
/// does not exist the call is a silent no-op. Returns the number of values
/// written.
pub fn set(doc: &mut Value, path: &Path, new_value: &Value) -> usize {
    set_elements(doc, path.as_slice(), new_value)
}

fn set_elements(value: &mut Value, elements: &[PathElement], new_value: &Value) -> usize {
    let Some((head, rest)) = elements.split_first() else {
        return 0;
    };

    if rest.is_empty() {
        return match (head, value) {
            (PathElement::Key(name), Value::Map(map)) => {
                map.set(name.clone(), new_value.clone());
                1
            }
            (PathElement::Wildcard, Value::List(items)) => {
                items.iter_mut().for_each(|item| *item = new_value.clone());
                items.len()
            }
            (PathElement::Filter(filter), Value::List(items)) => {
                let mut written = 0;
                for item in items.iter_mut().filter(|item| filter.matches(item)) {
                    *item = new_value.clone();
                    written += 1;
                }
                written
            }
            _ => 0,
        };
    }

    match (head, value) {
        (PathElement::Key(name), Value::Map(map)) => match map.get_mut(name) {
            Some(child) => set_elements(child, rest, new_value),
            None => 0,
        },
        (PathElement::Wildcard, Value::List(items)) => items
            .iter_mut()
            .map(|item| set_elements(item, rest, new_value))
            .sum(),
        (PathElement::Filter(filter), Value::List(items)) => items
            .iter_mut()
            .filter(|item| filter.matches(item))
            .map(|item| set_elements(item, rest, new_value))
            .sum(),
        _ => 0,
    }
}
