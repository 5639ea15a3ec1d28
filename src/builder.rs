use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use confique::Config;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::SourceChain;
use crate::document::DocumentStore;
use crate::env::{Environment, ProcessEnv};
use crate::error::LayerfigError;
use crate::overrides;
use crate::resolve::{self, MergedConfig, ResolveInput};
use crate::types::{Format, ProfileKeys, ProfileSelection};

/// Entry point for building a layerfig configuration.
pub struct Layerfig;

impl Layerfig {
    pub fn builder<C: Config>() -> LayerfigBuilder<C> {
        LayerfigBuilder::new()
    }
}

/// Builder for configuring and loading profile-aware configuration.
///
/// Controls four independent inputs:
///
/// - **Documents**: [`file()`](Self::file) / [`add_file()`](Self::add_file), the
///   structured files holding global defaults and profile sections.
/// - **Profile**: [`profile()`](Self::profile) / [`no_profile()`](Self::no_profile),
///   which section overlays the globals.
/// - **Environment**: [`env()`](Self::env) for placeholder lookups, and
///   [`env_prefix()`](Self::env_prefix) for the `PREFIX__KEY` layer.
/// - **Direct arguments**: [`set()`](Self::set) and friends, the highest layer.
///
/// The builder is reusable: [`load()`](Self::load) and its siblings take
/// `&self` and re-read the documents (through the store) on every call.
pub struct LayerfigBuilder<C: Config> {
    files: Vec<PathBuf>,
    format: Option<Format>,
    profile: ProfileSelection,
    keys: ProfileKeys,
    env: Arc<dyn Environment>,
    env_prefix: Option<String>,
    direct: Vec<(String, Value)>,
    strict: bool,
    store: Arc<DocumentStore>,
    args_error: Option<String>,
    _phantom: PhantomData<C>,
}

impl<C: Config> LayerfigBuilder<C> {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            format: None,
            profile: ProfileSelection::default(),
            keys: ProfileKeys::default(),
            env: Arc::new(ProcessEnv),
            env_prefix: None,
            direct: Vec::new(),
            strict: false,
            store: Arc::new(DocumentStore::new()),
            args_error: None,
            _phantom: PhantomData,
        }
    }

    /// Use a single config document, replacing any set before.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files = vec![path.into()];
        self
    }

    /// Add another config document.
    ///
    /// Documents are listed in **priority-ascending** order: later files are
    /// deep-merged over earlier ones before the profile is selected.
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Parse every document as `format` instead of guessing from the extension.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Overlay the named profile. A name the document doesn't define simply
    /// contributes nothing.
    pub fn profile(mut self, name: &str) -> Self {
        self.profile = ProfileSelection::Named(name.to_string());
        self
    }

    /// Use the global defaults only, ignoring the document's default profile.
    pub fn no_profile(mut self) -> Self {
        self.profile = ProfileSelection::Disabled;
        self
    }

    /// Rename the key holding the profile sections (default: `"profiles"`).
    pub fn profiles_key(mut self, key: &str) -> Self {
        self.keys.profiles = key.to_string();
        self
    }

    /// Rename the key naming the document's default profile
    /// (default: `"active_profile"`).
    pub fn default_profile_key(mut self, key: &str) -> Self {
        self.keys.default_profile = key.to_string();
        self
    }

    /// Environment used for placeholders and the prefixed layer
    /// (default: [`ProcessEnv`]).
    pub fn env(mut self, env: impl Environment + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Enable the `PREFIX__KEY` environment layer, e.g. `MYAPP__POOL__SIZE`.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Set a direct argument by dotted key. `Value::Null` masks every lower
    /// source, leaving the field to its schema default.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.direct.push((key.to_string(), value.into()));
        self
    }

    /// Set a direct argument if present. `None` values are ignored (useful
    /// for optional CLI flags).
    pub fn set_opt<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.direct.push((key.to_string(), v.into()));
        }
        self
    }

    /// Add direct arguments from any serializable source, auto-matching by
    /// field name.
    ///
    /// Serializes `source` into flat key-value pairs, skips `None` values, and
    /// keeps only keys that match config fields in `C`. Non-matching keys are
    /// silently ignored, so CLI-only fields like `command` or `verbose` are
    /// excluded. A source that can't be flattened fails the next load.
    ///
    /// Composes with [`set`](Self::set): both push to the same list, later
    /// calls take precedence.
    pub fn args_from<S: Serialize>(mut self, source: &S) -> Self {
        match overrides::flatten(source) {
            Ok(pairs) => {
                let valid = overrides::valid_keys(&C::META);
                self.direct
                    .extend(pairs.into_iter().filter(|(key, _)| valid.contains(key)));
            }
            Err(LayerfigError::InvalidValue { reason, .. }) => self.args_error = Some(reason),
            Err(e) => self.args_error = Some(e.to_string()),
        }
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, keys unknown to `C` in any source produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Read documents through `store`. Pass a shared
    /// [`DocumentStore::cached`] to reuse parsed files across builders.
    pub fn store(mut self, store: impl Into<Arc<DocumentStore>>) -> Self {
        self.store = store.into();
        self
    }

    /// Build the `ResolveInput` from current builder state.
    fn build_input(&self) -> Result<ResolveInput, LayerfigError> {
        if let Some(reason) = &self.args_error {
            return Err(LayerfigError::InvalidValue {
                key: "<direct arguments>".into(),
                reason: reason.clone(),
            });
        }

        let document = self.store.load_all(&self.files, self.format)?;

        Ok(ResolveInput {
            document,
            profile: self.profile.clone(),
            keys: self.keys.clone(),
            direct: self.direct.clone(),
            env_prefix: self.env_prefix.clone(),
        })
    }

    /// The precedence chain, one contribution per source, highest first.
    pub fn explain(&self) -> Result<SourceChain, LayerfigError> {
        let input = self.build_input()?;
        Ok(resolve::build_chain(input, self.env.as_ref()))
    }

    /// The merged configuration, before decoding into `C`.
    pub fn resolve(&self) -> Result<MergedConfig, LayerfigError> {
        let input = self.build_input()?;
        Ok(resolve::resolve(input, self.env.as_ref()))
    }

    /// Load and resolve the configuration through all layers.
    pub fn load(&self) -> Result<C, LayerfigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let input = self.build_input()?;
        resolve::resolve_typed(input, self.env.as_ref(), self.strict)
    }
}
