//! Core document types and operations.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Value represents a parsed YAML document node.
///
/// Mappings keep their insertion order for serialization, but equality
/// between two mappings ignores key order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

/// Map represents an ordered mapping where keys are strings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Map {
    pub fields: IndexMap<String, Value>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_) | Value::UInt(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns true for null, boolean, numeric and string values.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Returns a short name for the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::UInt(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "sequence",
            Value::Map(_) => "mapping",
        }
    }

    /// Renders a scalar as plain text.
    ///
    /// Whole floats print without a fractional part so that `1.0` and `1`
    /// coerce to the same string. Returns `None` for sequences and mappings.
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            Value::Null => Some("null".to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::UInt(u) => Some(u.to_string()),
            Value::Float(f) => Some(format_float(*f)),
            Value::String(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Coerces the value to a number.
    ///
    /// Numbers pass through, strings are parsed after trimming. Everything
    /// else, including empty strings, is not numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
            }
            _ => None,
        }
    }

    /// Returns a copy with every mapping's keys sorted.
    ///
    /// Used as the canonical form for comparison and reporting.
    pub fn normalized(&self) -> Value {
        match self {
            Value::List(items) => Value::List(items.iter().map(Value::normalized).collect()),
            Value::Map(map) => {
                let mut fields: Vec<(String, Value)> = map
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.normalized()))
                    .collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));
                Value::Map(fields.into_iter().collect())
            }
            other => other.clone(),
        }
    }

    /// Visits every scalar leaf, depth first, until the visitor returns `false`.
    ///
    /// Returns `false` if the walk was stopped early.
    pub fn walk_leaves<F>(&self, visitor: &mut F) -> bool
    where
        F: FnMut(&Value) -> bool,
    {
        match self {
            Value::List(items) => items.iter().all(|item| item.walk_leaves(visitor)),
            Value::Map(map) => map.fields.values().all(|v| v.walk_leaves(visitor)),
            leaf => visitor(leaf),
        }
    }

    /// Rewrites every string leaf with `f`. Keys are left alone.
    pub fn map_strings<F>(&self, f: &F) -> Value
    where
        F: Fn(&str) -> String,
    {
        match self {
            Value::String(s) => Value::String(f(s)),
            Value::List(items) => Value::List(items.iter().map(|v| v.map_strings(f)).collect()),
            Value::Map(map) => Value::Map(
                map.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.map_strings(f)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::UInt(a), Value::Float(b)) | (Value::Float(b), Value::UInt(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        // IndexMap equality is order-independent.
        self.fields == other.fields
    }
}

impl Map {
    pub fn new() -> Self {
        Map {
            fields: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Inserts or replaces a key. Replacing keeps the key's position.
    pub fn set(&mut self, key: String, value: Value) {
        self.fields.insert(key, value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Removes a key, keeping the order of the remaining keys.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Map {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(raw: serde_yaml::Value) -> Self {
        match raw {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(mapping) => Value::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (key_to_string(k), Value::from(v)))
                    .collect(),
            ),
            // Tags carry no meaning for synchronization; keep the tagged payload.
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

fn key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => {
            let converted = Value::from(other);
            match converted.to_plain_string() {
                Some(s) => s,
                None => serde_yaml::to_string(&converted)
                    .map(|s| s.trim_end().to_string())
                    .unwrap_or_default(),
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_yaml::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Parse a document from YAML. Empty input yields `Value::Null`.
pub fn from_yaml(yaml: &str) -> Result<Value, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str::<serde_yaml::Value>(yaml).map(Value::from)
}

/// Serialize a document to YAML.
pub fn to_yaml(value: &Value) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(value)
}

/// Serialize a document to JSON.
pub fn to_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_types() {
        assert!(Value::Null.is_null());
        assert!(Value::Bool(true).is_bool());
        assert!(Value::Int(42).is_int());
        assert!(Value::Float(3.5).is_float());
        assert!(Value::String("hello".into()).is_string());
        assert!(Value::List(vec![]).is_list());
        assert!(Value::Map(Map::new()).is_map());
        assert!(Value::Int(1).is_scalar());
        assert!(!Value::List(vec![]).is_scalar());
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::Bool(true), Value::Bool(true));
        assert_ne!(Value::Bool(true), Value::Bool(false));
        assert_eq!(Value::Int(42), Value::Int(42));
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::String("1".into()));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a = from_yaml("a: 1\nb: 2\n").unwrap();
        let b = from_yaml("b: 2\na: 1\n").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_map_operations() {
        let mut map = Map::new();
        assert!(map.is_empty());

        map.set("key".into(), Value::String("value".into()));
        map.set("other".into(), Value::Int(1));
        assert!(map.has("key"));
        assert_eq!(map.get("key"), Some(&Value::String("value".into())));

        map.delete("key");
        assert!(!map.has("key"));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["other"]);
    }

    #[test]
    fn test_yaml_roundtrip_keeps_key_order() {
        let text = "zeta: 1\nalpha:\n- name: a\n  value: x\n";
        let value = from_yaml(text).unwrap();
        assert_eq!(to_yaml(&value).unwrap(), text);
    }

    #[test]
    fn test_from_yaml_empty_and_non_string_keys() {
        assert_eq!(from_yaml("").unwrap(), Value::Null);
        let value = from_yaml("1: one\ntrue: yes\n").unwrap();
        assert_eq!(value.get("1"), Some(&Value::from("one")));
        assert_eq!(value.get("true"), Some(&Value::from("yes")));
    }

    #[test]
    fn test_large_unsigned_integers_roundtrip() {
        let text = "max: 18446744073709551615\nsmall: 7\n";
        let value = from_yaml(text).unwrap();
        assert_eq!(value.get("max"), Some(&Value::UInt(u64::MAX)));
        assert_eq!(value.get("small"), Some(&Value::Int(7)));
        assert_eq!(to_yaml(&value).unwrap(), text);
        assert_eq!(value.normalized(), value);
        assert_eq!(Value::UInt(u64::MAX).to_plain_string().as_deref(), Some("18446744073709551615"));
    }

    #[test]
    fn test_from_yaml_rejects_malformed() {
        assert!(from_yaml("a: [1, 2\n").is_err());
    }

    #[test]
    fn test_plain_string_coercion() {
        assert_eq!(Value::Float(2.0).to_plain_string().as_deref(), Some("2"));
        assert_eq!(Value::Float(2.5).to_plain_string().as_deref(), Some("2.5"));
        assert_eq!(Value::Bool(false).to_plain_string().as_deref(), Some("false"));
        assert_eq!(Value::List(vec![]).to_plain_string(), None);
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(Value::Int(3).as_number(), Some(3.0));
        assert_eq!(Value::from(" 4.5 ").as_number(), Some(4.5));
        assert_eq!(Value::from("abc").as_number(), None);
        assert_eq!(Value::from("").as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
    }

    #[test]
    fn test_normalized_sorts_keys() {
        let value = from_yaml("b: 1\na:\n  d: 1\n  c: 2\n").unwrap();
        let text = to_yaml(&value.normalized()).unwrap();
        assert_eq!(text, "a:\n  c: 2\n  d: 1\nb: 1\n");
    }

    #[test]
    fn test_map_strings_skips_keys_and_numbers() {
        let value = from_yaml("uat-key: uat-value\ncount: 3\n").unwrap();
        let mapped = value.map_strings(&|s| s.replace("uat", "prod"));
        assert_eq!(mapped.get("uat-key"), Some(&Value::from("prod-value")));
        assert_eq!(mapped.get("count"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_walk_leaves_stops_early() {
        let value = from_yaml("a: [1, 2, 3]\n").unwrap();
        let mut seen = 0;
        let finished = value.walk_leaves(&mut |leaf| {
            seen += 1;
            leaf != &Value::Int(2)
        });
        assert!(!finished);
        assert_eq!(seen, 2);
    }
}
