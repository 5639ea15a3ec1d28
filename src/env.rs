//! Environment access, injected rather than read from a hidden global.
//!
//! [`Environment`] is what placeholder expansion and the `PREFIX__KEY` layer
//! read from. [`ProcessEnv`] is the real process environment; [`MapEnv`] is a
//! fixed set of variables for tests or embedding.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

/// Read-only view of environment variables.
///
/// `get` must return `Some("")` for a variable set to the empty string and
/// `None` only when it is unset.
pub trait Environment: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    /// All variables, used by the `PREFIX__KEY` layer.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        let raw = std::env::var_os(name)?;
        match raw.into_string() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(name, "environment variable is not valid UTF-8, treating as unset");
                None
            }
        }
    }

    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

/// A fixed set of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Build a mapping from environment variables matching `{PREFIX}__*`.
///
/// Double underscore `__` separates nesting levels.
/// Single `_` within a segment is literal (part of the field name).
/// Segments are lowercased to match Rust field names.
///
/// Values stay strings; numbers and booleans are coerced when the merged
/// mapping is decoded into the config struct. When both `APP__POOL` and
/// `APP__POOL__SIZE` are set, `APP__POOL` wins and the other is logged.
pub fn env_to_map(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Map<String, Value> {
    let needle = format!("{prefix}__");
    let mut map = Map::new();

    // Sorted so a scalar always lands before the keys nested under it.
    let mut vars: Vec<(String, String)> = vars.into_iter().collect();
    vars.sort();

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(&needle) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        let segments: Vec<&str> = rest.split("__").collect();
        if segments.iter().any(|s| s.is_empty()) {
            continue;
        }
        insert_nested(&mut map, &segments, Value::String(value), &key);
    }

    map
}

fn insert_nested(map: &mut Map<String, Value>, segments: &[&str], value: Value, var: &str) {
    let key = segments[0].to_lowercase();

    if segments.len() == 1 {
        if map.get(&key).is_some_and(Value::is_object) {
            warn!(var, "environment variable replaces nested variables set under it");
        }
        map.insert(key, value);
        return;
    }

    let sub = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    match sub {
        Value::Object(sub_map) => insert_nested(sub_map, &segments[1..], value, var),
        _ => warn!(var, "a shorter environment variable already sets a parent of this key, ignoring it"),
    }
}
