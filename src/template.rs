//! `${NAME}` placeholder expansion over a document tree.
//!
//! Three placeholder forms are understood inside string values:
//!
//! | Form | `NAME` set | `NAME` set to `""` | `NAME` unset |
//! |------|------------|--------------------|--------------|
//! | `${NAME}` | value | `""` | field dropped |
//! | `${NAME-fallback}` | value | `""` | `fallback` |
//! | `${NAME:-fallback}` | value | `fallback` | `fallback` |
//!
//! A dropped field is absent from the expanded mapping, so a lower-precedence
//! source can still supply it. Placeholders may sit inside a longer string;
//! one unresolved placeholder drops the whole string.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::trace;

use crate::env::Environment;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?-)([^}]*))?\}")
        .expect("placeholder pattern is valid")
});

/// Expand every placeholder in `map`. Fields whose placeholders can't be
/// resolved are left out.
pub fn expand(map: Map<String, Value>, env: &dyn Environment) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| match expand_value(value, env) {
            Some(v) => Some((key, v)),
            None => {
                trace!(key = key.as_str(), "placeholder unresolved, field left to lower sources");
                None
            }
        })
        .collect()
}

/// Expand one value. `None` means the value has no resolution.
pub fn expand_value(value: Value, env: &dyn Environment) -> Option<Value> {
    match value {
        Value::String(s) => expand_str(&s, env).map(Value::String),
        Value::Object(map) => Some(Value::Object(expand(map, env))),
        Value::Array(items) => Some(Value::Array(
            items
                .into_iter()
                .filter_map(|item| expand_value(item, env))
                .collect(),
        )),
        other => Some(other),
    }
}

/// Substitute all placeholders in `s`, or `None` if any is unresolved.
pub fn expand_str(s: &str, env: &dyn Environment) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(s) {
        let whole = caps.get(0)?;
        out.push_str(&s[last..whole.start()]);
        out.push_str(&resolve_placeholder(&caps, env)?);
        last = whole.end();
    }

    out.push_str(&s[last..]);
    Some(out)
}

fn resolve_placeholder(caps: &Captures<'_>, env: &dyn Environment) -> Option<String> {
    let name = caps.get(1)?.as_str();
    let operator = caps.get(2).map(|m| m.as_str());
    let fallback = caps.get(3).map(|m| m.as_str());

    let resolved = match (env.get(name), operator) {
        (Some(v), Some(":-")) if v.is_empty() => fallback.map(str::to_string),
        (Some(v), _) => Some(v),
        (None, _) => fallback.map(str::to_string),
    };
    trace!(name, resolved = resolved.is_some(), "expanded placeholder");
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn set_variable_substituted() {
        let env = MapEnv::new().set("TEST_DB_URL", "postgresql://custom:5432/test");
        let out = expand(map(json!({"database_url": "${TEST_DB_URL}"})), &env);
        assert_eq!(out["database_url"], json!("postgresql://custom:5432/test"));
    }

    #[test]
    fn unset_without_fallback_drops_field() {
        let out = expand(map(json!({"database_url": "${TEST_DB_URL}", "debug": true})), &MapEnv::new());
        assert!(!out.contains_key("database_url"));
        assert_eq!(out["debug"], json!(true));
    }

    #[test]
    fn unset_uses_fallback() {
        let out = expand(
            map(json!({"database_url": "${TEST_DB_URL-postgresql://localhost:5432/dev}"})),
            &MapEnv::new(),
        );
        assert_eq!(out["database_url"], json!("postgresql://localhost:5432/dev"));
    }

    #[test]
    fn empty_variable_honoured_over_fallback() {
        let env = MapEnv::new().set("TEST_DB_URL", "");
        let out = expand(
            map(json!({"database_url": "${TEST_DB_URL-postgresql://localhost:5432/dev}"})),
            &env,
        );
        assert_eq!(out["database_url"], json!(""));
    }

    #[test]
    fn colon_dash_treats_empty_as_unset() {
        let env = MapEnv::new().set("LEVEL", "");
        assert_eq!(expand_str("${LEVEL:-info}", &env).as_deref(), Some("info"));
        let env = MapEnv::new().set("LEVEL", "warn");
        assert_eq!(expand_str("${LEVEL:-info}", &env).as_deref(), Some("warn"));
    }

    #[test]
    fn empty_fallback_is_a_value() {
        assert_eq!(expand_str("${NOPE-}", &MapEnv::new()).as_deref(), Some(""));
    }

    #[test]
    fn embedded_placeholders() {
        let env = MapEnv::new().set("HOST", "db.internal").set("PORT", "5433");
        assert_eq!(
            expand_str("postgres://${HOST}:${PORT-5432}/app", &env).as_deref(),
            Some("postgres://db.internal:5433/app")
        );
    }

    #[test]
    fn one_unresolved_embedded_drops_string() {
        let env = MapEnv::new().set("HOST", "db.internal");
        assert_eq!(expand_str("postgres://${HOST}:${PORT}/app", &env), None);
    }

    #[test]
    fn non_placeholder_text_untouched() {
        let env = MapEnv::new();
        assert_eq!(expand_str("plain $HOME {x} $", &env).as_deref(), Some("plain $HOME {x} $"));
    }

    #[test]
    fn nested_mappings_expanded() {
        let env = MapEnv::new().set("POOL", "7");
        let out = expand(map(json!({"database": {"pool": "${POOL}", "url": "${URL}"}})), &env);
        assert_eq!(Value::Object(out), json!({"database": {"pool": "7"}}));
    }

    #[test]
    fn sequence_elements_expanded_and_unresolved_dropped() {
        let env = MapEnv::new().set("A", "a");
        let out = expand(map(json!({"hosts": ["${A}", "${B}", "c"]})), &env);
        assert_eq!(out["hosts"], json!(["a", "c"]));
    }

    #[test]
    fn non_string_scalars_pass_through() {
        let doc = map(json!({"debug": false, "timeout": 30, "ratio": 0.5, "nothing": null}));
        assert_eq!(expand(doc.clone(), &MapEnv::new()), doc);
    }

    #[test]
    fn expansion_is_idempotent() {
        let env = MapEnv::new().set("A", "x");
        let doc = map(json!({"a": "${A}", "b": {"c": "${C-d}"}}));
        let once = expand(doc.clone(), &env);
        let twice = expand(doc, &env);
        assert_eq!(once, twice);
    }
}
