//! Splitting a document into its global section and one profile section.
//!
//! ```yaml
//! active_profile: dev          # file's default profile (optional)
//! database_url: default_db     # global defaults
//! debug: false
//! profiles:
//!   dev:                       # profile sections
//!     debug: true
//!   prod:
//!     debug: false
//! ```
//!
//! Selecting a profile the document doesn't define is a normal fallback path:
//! the profile section is simply empty and the global defaults apply.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::document::Document;
use crate::env::Environment;
use crate::template;
use crate::types::{ProfileKeys, ProfileSelection};

/// The two file-derived contributions, before placeholder expansion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    /// Top-level fields, with the reserved keys removed.
    pub global: Map<String, Value>,
    /// Fields of the selected profile; empty if none applies.
    pub profile: Map<String, Value>,
    /// Name of the selected profile, whether or not the document defines it.
    pub profile_name: Option<String>,
}

/// Select the profile section named by `selection`.
///
/// The document's default-profile value may itself be a placeholder and is
/// expanded against `env` before lookup.
pub fn select(
    mut document: Document,
    selection: &ProfileSelection,
    keys: &ProfileKeys,
    env: &dyn Environment,
) -> Sections {
    let profiles = document.remove(&keys.profiles);
    let file_default = document.remove(&keys.default_profile);

    let profile_name = match selection {
        ProfileSelection::Disabled => None,
        ProfileSelection::Named(name) => Some(name.clone()),
        ProfileSelection::FileDefault => file_default
            .and_then(|v| template::expand_value(v, env))
            .and_then(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                Value::String(_) | Value::Null => None,
                other => {
                    warn!(key = keys.default_profile.as_str(), value = %other, "default profile is not a string, ignoring");
                    None
                }
            }),
    };

    let profile = match (&profile_name, profiles) {
        (None, _) => Map::new(),
        (Some(name), Some(Value::Object(mut all))) => match all.remove(name) {
            Some(Value::Object(section)) => {
                debug!(profile = name.as_str(), "selected profile");
                section
            }
            Some(Value::Null) => Map::new(),
            Some(other) => {
                warn!(profile = name.as_str(), value = %other, "profile section is not a mapping, ignoring");
                Map::new()
            }
            None => {
                debug!(profile = name.as_str(), "profile not defined, using global defaults only");
                Map::new()
            }
        },
        (Some(name), Some(Value::Null) | None) => {
            debug!(profile = name.as_str(), "document defines no profiles, using global defaults only");
            Map::new()
        }
        (Some(_), Some(other)) => {
            warn!(key = keys.profiles.as_str(), value = %other, "profiles key is not a mapping, ignoring");
            Map::new()
        }
    };

    Sections {
        global: document,
        profile,
        profile_name,
    }
}
