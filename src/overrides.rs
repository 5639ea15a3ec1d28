//! Direct arguments: dotted-key values supplied by the caller.
//!
//! Each `("database.url", Value)` pair is expanded into the nested mapping
//! needed for deep-merge with the other contributions. Direct arguments are
//! literal values and are never placeholder-expanded.

use std::collections::HashSet;

use confique::meta::{FieldKind, Meta};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::LayerfigError;

/// Convert dotted-key entries into a nested mapping.
///
/// `("database.url", "pg://")` becomes `{database: {url: "pg://"}}`.
///
/// If multiple entries target the same key, the last one wins. An entry
/// whose path runs through a non-mapping value replaces that value.
pub fn overrides_to_map(entries: &[(String, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (dotted_key, value) in entries {
        set_nested(&mut map, dotted_key, value.clone());
    }
    map
}

fn set_nested(map: &mut Map<String, Value>, dotted_key: &str, value: Value) {
    let (parents, leaf) = match dotted_key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, dotted_key),
    };

    let mut current = map;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        let slot = current
            .entry(segment)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            unreachable!("slot was just made a mapping");
        };
        current = next;
    }

    current.insert(leaf.to_string(), value);
}

/// Flatten a `Serialize` value into dotted key-value pairs.
///
/// Structs and maps are recursed into: `Outer { database: Inner { url } }`
/// yields `("database.url", url)`. `None` fields are skipped, so a clap
/// struct with unset optional flags contributes only what the user passed.
pub fn flatten<S: Serialize>(source: &S) -> Result<Vec<(String, Value)>, LayerfigError> {
    let value = serde_json::to_value(source).map_err(|e| LayerfigError::InvalidValue {
        key: "<direct arguments>".into(),
        reason: e.to_string(),
    })?;

    let mut out = Vec::new();
    match value {
        Value::Object(map) => collect_pairs(map, "", &mut out),
        Value::Null => {}
        other => {
            return Err(LayerfigError::InvalidValue {
                key: "<direct arguments>".into(),
                reason: format!("expected a struct or map, got {other}"),
            });
        }
    }
    Ok(out)
}

fn collect_pairs(map: Map<String, Value>, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let dotted = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Null => {}
            Value::Object(nested) => collect_pairs(nested, &dotted, out),
            other => out.push((dotted, other)),
        }
    }
}

/// Collect all valid leaf key paths from a confique `Meta` tree.
///
/// Returns dotted paths like `"host"`, `"database.url"`, `"database.pool_size"`.
/// Section names (nested structs) are excluded.
pub fn valid_keys(meta: &Meta) -> HashSet<String> {
    let mut keys = HashSet::new();
    collect_keys(meta, "", &mut keys);
    keys
}

fn collect_keys(meta: &Meta, prefix: &str, keys: &mut HashSet<String>) {
    for field in meta.fields {
        let dotted = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        match &field.kind {
            FieldKind::Leaf { .. } => {
                keys.insert(dotted);
            }
            FieldKind::Nested { meta, .. } => {
                collect_keys(meta, &dotted, keys);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::AppConfig;
    use confique::Config;
    use serde_json::json;
    use std::collections::HashMap;

    fn entries(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn flat_and_nested_keys() {
        let map = overrides_to_map(&entries(&[
            ("database_url", json!("direct://localhost/db")),
            ("pool.size", json!(20)),
            ("pool.timeout", json!(5)),
        ]));
        assert_eq!(
            Value::Object(map),
            json!({"database_url": "direct://localhost/db", "pool": {"size": 20, "timeout": 5}})
        );
    }

    #[test]
    fn deep_nesting() {
        let map = overrides_to_map(&entries(&[("a.b.c.d", json!(42))]));
        assert_eq!(map["a"]["b"]["c"]["d"], json!(42));
    }

    #[test]
    fn null_entry_is_kept() {
        let map = overrides_to_map(&entries(&[("api_key", Value::Null)]));
        assert_eq!(map.get("api_key"), Some(&Value::Null));
    }

    #[test]
    fn last_entry_wins_for_same_key() {
        let map = overrides_to_map(&entries(&[("timeout", json!(30)), ("timeout", json!(99))]));
        assert_eq!(map["timeout"], json!(99));
    }

    #[test]
    fn path_through_scalar_replaces_it() {
        let map = overrides_to_map(&entries(&[("pool", json!(1)), ("pool.size", json!(2))]));
        assert_eq!(map["pool"], json!({"size": 2}));
    }

    #[test]
    fn empty_list_empty_map() {
        assert!(overrides_to_map(&[]).is_empty());
    }

    #[test]
    fn flatten_skips_none() {
        #[derive(Serialize)]
        struct Args {
            database_url: Option<String>,
            timeout: Option<u32>,
            debug: bool,
        }
        let pairs = flatten(&Args {
            database_url: None,
            timeout: Some(60),
            debug: true,
        })
        .unwrap();
        assert_eq!(
            pairs,
            vec![("debug".into(), json!(true)), ("timeout".into(), json!(60))]
        );
    }

    #[test]
    fn flatten_nested_struct() {
        #[derive(Serialize)]
        struct Inner {
            size: u32,
        }
        #[derive(Serialize)]
        struct Outer {
            pool: Inner,
        }
        let pairs = flatten(&Outer {
            pool: Inner { size: 3 },
        })
        .unwrap();
        assert_eq!(pairs, vec![("pool.size".into(), json!(3))]);
    }

    #[test]
    fn flatten_hashmap() {
        let mut map = HashMap::new();
        map.insert("timeout".to_string(), 5);
        assert_eq!(flatten(&map).unwrap(), vec![("timeout".into(), json!(5))]);
    }

    #[test]
    fn flatten_rejects_scalars() {
        assert!(matches!(
            flatten(&42),
            Err(LayerfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn valid_keys_collects_all_leaf_paths() {
        let keys = valid_keys(&AppConfig::META);
        for key in [
            "database_url",
            "api_key",
            "debug",
            "timeout",
            "max_connections",
            "pool.size",
            "pool.recycle_secs",
        ] {
            assert!(keys.contains(key), "missing {key}");
        }
        assert_eq!(keys.len(), 7);
        assert!(!keys.contains("pool"));
    }
}
