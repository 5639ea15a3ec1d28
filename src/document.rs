//! Loading config documents from disk.
//!
//! Every supported format is normalised into a [`Document`] (a
//! `serde_json` mapping), so the rest of the pipeline never sees format
//! specifics. A missing or blank file is an empty document, not an error;
//! only malformed content ([`ParseError`](LayerfigError::ParseError)) and
//! real I/O failures (permissions, etc.) are reported.
//!
//! Several files can be loaded at once with [`DocumentStore::load_all`]. They
//! are listed in **priority-ascending** order and deep-merged, later files
//! overriding earlier ones key by key, before profiles are selected.
//!
//! # Caching
//!
//! [`DocumentStore::new`] reads the file on every call. [`DocumentStore::cached`]
//! keeps parsed documents keyed by path and reuses one only while the file's
//! modification time is unchanged. The cache sits behind a mutex so one store
//! can serve loads from several threads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::LayerfigError;
use crate::merge::deep_merge;
use crate::types::Format;

/// A parsed config file.
pub type Document = Map<String, Value>;

type Cache = HashMap<PathBuf, (SystemTime, Document)>;

/// Reads and parses config documents, optionally caching them.
#[derive(Debug, Default)]
pub struct DocumentStore {
    cache: Option<Mutex<Cache>>,
}

impl DocumentStore {
    /// A store that re-reads files on every load.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that reuses parsed documents while their mtime is unchanged.
    pub fn cached() -> Self {
        Self {
            cache: Some(Mutex::new(HashMap::new())),
        }
    }

    /// Load one document. `format` overrides extension-based detection.
    pub fn load(&self, path: &Path, format: Option<Format>) -> Result<Document, LayerfigError> {
        let modified = match std::fs::metadata(path) {
            Ok(meta) => meta.modified().ok(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using empty document");
                return Ok(Document::new());
            }
            Err(e) => {
                return Err(LayerfigError::IoError {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        if let (Some(cache), Some(mtime)) = (&self.cache, modified) {
            let cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some((cached_mtime, doc)) = cache.get(path)
                && *cached_mtime == mtime
            {
                debug!(path = %path.display(), "config file served from cache");
                return Ok(doc.clone());
            }
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => {
                return Err(LayerfigError::IoError {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let format = match format.or_else(|| Format::from_path(path)) {
            Some(f) => f,
            None => {
                return Err(LayerfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        let doc = parse(&content, format, path)?;
        debug!(path = %path.display(), %format, keys = doc.len(), "loaded config file");

        if let (Some(cache), Some(mtime)) = (&self.cache, modified) {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(path.to_path_buf(), (mtime, doc.clone()));
        }

        Ok(doc)
    }

    /// Load several documents and deep-merge them (later paths win).
    pub fn load_all(&self, paths: &[PathBuf], format: Option<Format>) -> Result<Document, LayerfigError> {
        let mut merged = Document::new();
        for path in paths {
            merged = deep_merge(merged, self.load(path, format)?);
        }
        Ok(merged)
    }
}

/// Parse document text. `path` is only used in error messages.
pub fn parse(content: &str, format: Format, path: &Path) -> Result<Document, LayerfigError> {
    if content.trim().is_empty() {
        return Ok(Document::new());
    }

    let parse_error = |message: String| LayerfigError::ParseError {
        path: path.to_path_buf(),
        format,
        message,
    };

    let value = match format {
        Format::Toml => {
            let table: toml::Table = content.parse().map_err(|e: toml::de::Error| parse_error(e.to_string()))?;
            toml_to_json(toml::Value::Table(table))
        }
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        #[cfg(feature = "yaml")]
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        #[cfg(not(feature = "yaml"))]
        Format::Yaml => {
            return Err(LayerfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        // A YAML file holding only comments parses to null.
        Value::Null => Ok(Document::new()),
        other => Err(parse_error(format!(
            "top level must be a mapping, found {}",
            kind_name(&other)
        ))),
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
