//! Tests for deep merge operations.
//!
//! Each case filters the source by its skip-paths first, the same way the
//! diff stage hands documents to the merger.

#[cfg(test)]
mod tests {
    use crate::fieldpath::{delete, get, parse_path, Path};
    use crate::merge::{apply_fixed_values, merge_documents, FixedValue};
    use crate::value::{from_yaml, Value};
    use pretty_assertions::assert_eq;

    /// Helper to parse a list of skip-paths.
    fn paths(raw: &[&str]) -> Vec<Path> {
        raw.iter().map(|p| parse_path(p).unwrap()).collect()
    }

    /// Helper to strip skip-paths from a document.
    fn filtered(doc: &Value, skip: &[Path]) -> Value {
        skip.iter().fold(doc.clone(), |acc, path| delete(&acc, path))
    }

    /// Merges `source` into `dest` the way a sync run does.
    fn merge(dest: &str, source: &str, skip: &[&str]) -> Value {
        let skip = paths(skip);
        let dest = from_yaml(dest).unwrap();
        let source = filtered(&from_yaml(source).unwrap(), &skip);
        merge_documents(&dest, &source, &skip)
    }

    fn yaml(text: &str) -> Value {
        from_yaml(text).unwrap()
    }

    #[test]
    fn test_merge_deletes_fields_absent_from_source() {
        let merged = merge(
            "image: {tag: 1.0.0, pullPolicy: Always}",
            "image: {tag: 2.0.0}\nreplicas: 3",
            &[],
        );
        assert_eq!(merged, yaml("image: {tag: 2.0.0}\nreplicas: 3"));
    }

    #[test]
    fn test_merge_keeps_skip_path_value() {
        let merged = merge(
            "image: {tag: 1.0.0, pullPolicy: Always}",
            "image: {tag: 2.0.0}\nreplicas: 3",
            &["image.pullPolicy"],
        );
        assert_eq!(
            merged,
            yaml("image: {tag: 2.0.0, pullPolicy: Always}\nreplicas: 3")
        );
    }

    #[test]
    fn test_skip_path_ignores_source_value() {
        let merged = merge(
            "image: {tag: 1.0.0, pullPolicy: Always}",
            "image: {tag: 2.0.0, pullPolicy: Never}",
            &["image.pullPolicy"],
        );
        assert_eq!(
            get(&merged, &parse_path("image.pullPolicy").unwrap()),
            Some(&Value::from("Always"))
        );

        // Absent in the destination stays absent.
        let merged = merge("image: {tag: 1.0.0}", "image: {tag: 2.0.0, pullPolicy: Never}", &["image.pullPolicy"]);
        assert_eq!(merged, yaml("image: {tag: 2.0.0}"));
    }

    #[test]
    fn test_arrays_replaced_wholesale() {
        let merged = merge(
            "args: [--a, --b, --c]\nports: [{port: 80}]",
            "args: [--x]\nports: []",
            &["image.tag"],
        );
        assert_eq!(merged, yaml("args: [--x]\nports: []"));
    }

    #[test]
    fn test_array_filter_preserves_destination_item() {
        let merged = merge(
            "env:\n- {name: API_URL, value: https://uat}\n- {name: DEBUG, value: X}\n",
            "env:\n- {name: API_URL, value: https://prod}\n- {name: LOG, value: info}\n- {name: DEBUG, value: Y}\n",
            &["env[name=DEBUG]"],
        );
        assert_eq!(
            merged,
            yaml("env:\n- {name: API_URL, value: https://prod}\n- {name: LOG, value: info}\n- {name: DEBUG, value: X}\n")
        );
        let debug_items = merged
            .get("env")
            .and_then(Value::as_list)
            .unwrap()
            .iter()
            .filter(|item| item.get("name") == Some(&Value::from("DEBUG")))
            .count();
        assert_eq!(debug_items, 1);
    }

    #[test]
    fn test_array_filter_suppresses_duplicates() {
        let merged = merge(
            "env:\n- {name: DEBUG, value: X}\n- {name: DEBUG, value: Z}\n",
            "env:\n- {name: API, value: a}\n",
            &["env[name=DEBUG]"],
        );
        assert_eq!(
            merged,
            yaml("env:\n- {name: API, value: a}\n- {name: DEBUG, value: X}\n")
        );
    }

    #[test]
    fn test_array_filter_operators() {
        let merged = merge(
            "env:\n- {name: FEATURE_A, value: on}\n- {name: FEATURE_B, value: off}\n- {name: OLD, value: x}\n",
            "env:\n- {name: NEW, value: y}\n",
            &["env[name^=FEATURE_]"],
        );
        assert_eq!(
            merged,
            yaml("env:\n- {name: NEW, value: y}\n- {name: FEATURE_A, value: on}\n- {name: FEATURE_B, value: off}\n")
        );
    }

    #[test]
    fn test_nested_filter_keeps_field_inside_item() {
        let merged = merge(
            "env:\n- {name: DEBUG, value: X}\n- {name: API, value: a}\n",
            "env:\n- {name: API, value: b}\n- {name: DEBUG, value: Y}\n",
            &["env[name=DEBUG].value"],
        );
        assert_eq!(
            merged,
            yaml("env:\n- {name: API, value: b}\n- {name: DEBUG, value: X}\n")
        );
    }

    #[test]
    fn test_wildcard_nested_pairs_by_position() {
        let merged = merge(
            "containers:\n- {name: web, image: web:1}\n- {name: sidecar, image: proxy:1}\n",
            "containers:\n- {name: web, image: web:2}\n- {name: sidecar, image: proxy:2}\n- {name: extra, image: extra:2}\n",
            &["containers[*].image"],
        );
        assert_eq!(
            merged,
            yaml("containers:\n- {name: web, image: web:1}\n- {name: sidecar, image: proxy:1}\n- {name: extra}\n")
        );
    }

    #[test]
    fn test_terminal_wildcard_keeps_destination_array() {
        let merged = merge(
            "hosts: [a.uat, b.uat]\nname: x",
            "hosts: [a.prod]\nname: y",
            &["hosts[*]"],
        );
        assert_eq!(merged, yaml("hosts: [a.uat, b.uat]\nname: y"));
    }

    #[test]
    fn test_protected_key_is_not_resurrected_from_ancestors() {
        // The source dropped the whole parent: nothing left to protect inside.
        let merged = merge("image: {tag: 1.0.0, pullPolicy: Always}", "replicas: 1", &["image.pullPolicy"]);
        assert_eq!(merged, yaml("replicas: 1"));

        // Keeping `image: {pullPolicy: Always}` would leave an `image` mapping
        // the source lacks, and the next comparison would report a change.
        let skip = paths(&["image.pullPolicy"]);
        let dest = yaml("image: {tag: 1.0.0, pullPolicy: Always}\nreplicas: 1");
        let source = filtered(&yaml("replicas: 3"), &skip);
        let merged = merge_documents(&dest, &source, &skip);
        assert_eq!(merged, yaml("replicas: 3"));
        assert_eq!(filtered(&merged, &skip).normalized(), source.normalized());
    }

    #[test]
    fn test_type_change_takes_source() {
        let merged = merge("config: {a: 1}", "config: [1, 2]", &[]);
        assert_eq!(merged, yaml("config: [1, 2]"));
        let merged = merge("config: [1]", "config: null", &[]);
        assert_eq!(merged, yaml("config: null"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let skip = paths(&["image.pullPolicy", "env[name=DEBUG]", "containers[*].image"]);
        let dest = yaml(
            "image: {tag: 1.0.0, pullPolicy: Always}\nenv:\n- {name: DEBUG, value: X}\ncontainers:\n- {name: a, image: a:1}\nold: true\n",
        );
        let source = filtered(
            &yaml("image: {tag: 2.0.0}\nenv:\n- {name: API, value: b}\ncontainers:\n- {name: a, image: a:2}\n"),
            &skip,
        );

        let once = merge_documents(&dest, &source, &skip);
        let twice = merge_documents(&once, &source, &skip);
        assert_eq!(once, twice);
        assert_eq!(filtered(&once, &skip).normalized(), source.normalized());
    }

    #[test]
    fn test_fixed_values_after_merge() {
        let mut merged = merge("replicas: 1\nimage: {tag: 1.0.0}", "replicas: 5\nimage: {tag: 2.0.0}", &[]);
        let replicas = FixedValue::new(parse_path("replicas").unwrap(), Value::Int(2));
        let missing = FixedValue::new(parse_path("ingress.host").unwrap(), Value::from("prod.example.com"));
        apply_fixed_values(&mut merged, &[&replicas, &missing]);
        assert_eq!(merged, yaml("replicas: 2\nimage: {tag: 2.0.0}"));
    }
}
