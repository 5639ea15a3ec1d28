use std::fmt;
use std::path::Path;

/// Structured file format of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// Guess the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => write!(f, "YAML"),
            Format::Toml => write!(f, "TOML"),
            Format::Json => write!(f, "JSON"),
        }
    }
}

/// Which profile section of the document overlays the global defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProfileSelection {
    /// Use the profile the document itself names under its default-profile
    /// key (`active_profile` unless renamed). No profile if it names none.
    #[default]
    FileDefault,
    /// Use this profile. Unknown names contribute nothing.
    Named(String),
    /// No profile layer, even if the document names a default one.
    Disabled,
}

/// Names of the reserved top-level keys of a config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileKeys {
    /// Key holding the mapping of named profile sections.
    pub profiles: String,
    /// Key naming the profile to use when the caller doesn't pick one.
    pub default_profile: String,
}

impl Default for ProfileKeys {
    fn default() -> Self {
        Self {
            profiles: "profiles".into(),
            default_profile: "active_profile".into(),
        }
    }
}

/// A contributor in the precedence chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Values passed to the builder by the caller.
    Direct,
    /// `PREFIX__KEY` environment variables.
    Environment,
    /// The selected profile section of the document.
    Profile(String),
    /// Top-level fields of the document.
    Global,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Direct => write!(f, "direct arguments"),
            Source::Environment => write!(f, "environment"),
            Source::Profile(name) => write!(f, "profile '{name}'"),
            Source::Global => write!(f, "global defaults"),
        }
    }
}
