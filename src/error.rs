use std::path::PathBuf;

use thiserror::Error;

use crate::types::Format;

#[derive(Debug, Error)]
pub enum LayerfigError {
    #[error("Failed to parse {path} as {format}: {message}")]
    ParseError {
        path: PathBuf,
        format: Format,
        message: String,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot tell the format of {path}: use .yaml, .yml, .toml or .json, or call .format() on the builder")]
    UnsupportedFormat { path: PathBuf },

    #[error("Unknown key '{key}' in {origin}")]
    UnknownKey { key: String, origin: String },

    #[error("Unknown keys in configuration")]
    UnknownKeys(Vec<LayerfigError>),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),
}
