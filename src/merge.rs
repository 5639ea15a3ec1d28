use serde_json::{Map, Value};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a mapping for the same key, recurse.
/// Otherwise, `overlay`'s value wins, including `Null`.
pub fn deep_merge(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
                base.insert(key, Value::Object(deep_merge(base_map, overlay_map)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

/// Fold contributions listed highest precedence first into one mapping.
///
/// Equivalent to `deep_merge(... deep_merge(Sn, Sn-1) ..., S1)`.
pub fn merge_chain<I>(contributions: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
    I::IntoIter: DoubleEndedIterator,
{
    contributions.into_iter().rev().fold(Map::new(), deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn disjoint_keys_merge() {
        let merged = deep_merge(map(json!({"host": "localhost"})), map(json!({"port": 3000})));
        assert_eq!(Value::Object(merged), json!({"host": "localhost", "port": 3000}));
    }

    #[test]
    fn same_scalar_key_overlay_wins() {
        let merged = deep_merge(map(json!({"port": 8080})), map(json!({"port": 3000})));
        assert_eq!(merged["port"], json!(3000));
    }

    #[test]
    fn nested_mappings_recurse() {
        let base = map(json!({"database": {"url": "postgres://old", "pool_size": 5}}));
        let overlay = map(json!({"database": {"pool_size": 20}}));
        let merged = deep_merge(base, overlay);
        assert_eq!(
            merged["database"],
            json!({"url": "postgres://old", "pool_size": 20})
        );
    }

    #[test]
    fn overlay_scalar_replaces_mapping() {
        let base = map(json!({"database": {"url": "x"}}));
        let overlay = map(json!({"database": "flat_string"}));
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["database"], json!("flat_string"));
    }

    #[test]
    fn overlay_mapping_replaces_scalar() {
        let merged = deep_merge(map(json!({"value": 42})), map(json!({"value": {"nested": true}})));
        assert_eq!(merged["value"], json!({"nested": true}));
    }

    #[test]
    fn sequences_replace_wholesale() {
        let merged = deep_merge(map(json!({"hosts": ["a", "b", "c"]})), map(json!({"hosts": ["z"]})));
        assert_eq!(merged["hosts"], json!(["z"]));
    }

    #[test]
    fn null_overlay_is_present() {
        let merged = deep_merge(map(json!({"api_key": "secret"})), map(json!({"api_key": null})));
        assert_eq!(merged["api_key"], Value::Null);
    }

    #[test]
    fn empty_string_overlay_is_present() {
        let merged = deep_merge(map(json!({"url": "pg://"})), map(json!({"url": ""})));
        assert_eq!(merged["url"], json!(""));
    }

    #[test]
    fn empty_overlay_returns_base() {
        let base = map(json!({"port": 8080}));
        assert_eq!(deep_merge(base.clone(), Map::new()), base);
    }

    #[test]
    fn deeply_nested_three_levels() {
        let base = map(json!({"a": {"b": {"c": {"val": 1, "other": "keep"}}}}));
        let overlay = map(json!({"a": {"b": {"c": {"val": 99}}}}));
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["a"]["b"]["c"], json!({"val": 99, "other": "keep"}));
    }

    #[test]
    fn chain_highest_first_wins() {
        let merged = merge_chain(vec![
            map(json!({"host": "direct"})),
            map(json!({"host": "profile", "port": 1000})),
            map(json!({"host": "global", "port": 1, "debug": false})),
        ]);
        assert_eq!(
            Value::Object(merged),
            json!({"host": "direct", "port": 1000, "debug": false})
        );
    }

    #[test]
    fn chain_matches_pairwise_fold() {
        let s1 = map(json!({"db": {"url": "one"}}));
        let s2 = map(json!({"db": {"pool": 2}, "x": [1]}));
        let s3 = map(json!({"db": {"url": "three", "timeout": 3}, "x": [3, 3]}));
        let folded = deep_merge(deep_merge(s3.clone(), s2.clone()), s1.clone());
        assert_eq!(merge_chain(vec![s1, s2, s3]), folded);
    }

    #[test]
    fn empty_chain_is_empty() {
        assert!(merge_chain(Vec::<Map<String, Value>>::new()).is_empty());
    }
}
