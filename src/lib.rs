//! Profile-aware, layered configuration for Rust applications. Define a
//! struct, point at a document, pick a profile, and go.
//!
//! Layerfig resolves configuration from a structured document (YAML, TOML or
//! JSON) holding global defaults plus named profile sections, lets values
//! reference environment variables through `${NAME}` placeholders, and puts
//! caller-supplied arguments on top. Built on
//! [confique](https://docs.rs/confique) for struct-driven defaults.
//!
//! ```ignore
//! let config: AppConfig = Layerfig::builder()
//!     .file("config.yaml")
//!     .profile("prod")
//!     .load()?;
//! ```
//!
//! # Document shape
//!
//! ```yaml
//! database_url: default_db              # global defaults
//! debug: false
//! active_profile: dev                   # used when the caller picks none
//! profiles:
//!   dev:
//!     database_url: "${TEST_DB_URL-postgresql://localhost:5432/dev}"
//!     debug: true
//!   prod:
//!     database_url: "${PROD_DB_URL:-postgresql://prod:5432/prod}"
//! ```
//!
//! `profiles` and `active_profile` are reserved; rename them with
//! [`profiles_key()`](LayerfigBuilder::profiles_key) and
//! [`default_profile_key()`](LayerfigBuilder::default_profile_key). Selecting
//! a profile the document doesn't define is not an error: the global
//! defaults apply on their own.
//!
//! # Layer precedence
//!
//! ```text
//! Schema defaults       #[config(default = ...)]
//!        ↑ overridden by
//! Global defaults       top-level document fields
//!        ↑ overridden by
//! Profile               profiles.<name>
//!        ↑ overridden by
//! Environment vars      PREFIX__KEY (only with .env_prefix())
//!        ↑ overridden by
//! Direct arguments      .set() / .args_from()
//! ```
//!
//! Every layer is **sparse** and merged **deeply**: a profile that sets
//! `pool.size` keeps the global `pool.recycle_secs`. Sequences and scalars are
//! replaced whole. An explicit `null` is a value: it masks every lower layer,
//! and the field then falls back to its schema default.
//!
//! # Placeholders
//!
//! String values in the global and profile sections may reference the
//! environment:
//!
//! | Form | Unset | Empty |
//! |------|-------|-------|
//! | `${NAME}` | field dropped | `""` |
//! | `${NAME-fallback}` | `fallback` | `""` |
//! | `${NAME:-fallback}` | `fallback` | `fallback` |
//!
//! A dropped field simply contributes nothing, so the next lower layer (or
//! the schema default) shows through. Placeholders can be embedded in longer
//! strings (`"postgres://${DB_HOST-localhost}:5432"`). Direct arguments are
//! taken literally and never expanded.
//!
//! Expanded values are strings. Decoding coerces them where the struct wants
//! something else, so `max_connections: "${MAX_CONN-10}"` fills a `u32`.
//!
//! # Strict mode
//!
//! Off by default. With [`.strict(true)`](LayerfigBuilder::strict), a key
//! that doesn't match any field in your struct fails the load, naming the
//! source it came from:
//!
//! ```text
//! Unknown key 'databse_url' in profile 'dev'
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`LayerfigError`]. A missing document, an
//! unknown profile and an unset variable are normal fallback paths, not
//! errors. Malformed documents report the path and format; missing required
//! fields surface as confique's own error.

pub mod error;
pub mod types;

mod builder;
mod chain;
mod coerce;
mod document;
mod env;
mod merge;
mod overrides;
mod profile;
mod resolve;
mod template;
mod validate;

#[cfg(test)]
mod fixtures;

pub use builder::{Layerfig, LayerfigBuilder};
pub use chain::{Contribution, SourceChain};
pub use document::{Document, DocumentStore};
pub use env::{Environment, MapEnv, ProcessEnv};
pub use error::LayerfigError;
pub use merge::deep_merge;
pub use resolve::MergedConfig;
pub use types::{Format, ProfileKeys, ProfileSelection, Source};
