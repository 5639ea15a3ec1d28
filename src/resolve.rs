//! Core resolution pipeline: build the source chain, merge it, and decode.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no file I/O, making the
//! full pipeline testable with synthetic documents and environments. Steps:
//!
//! 1. Split the document into global and profile sections
//! 2. Expand placeholders in each section independently
//! 3. Chain: direct args > `PREFIX__KEY` env > profile > global
//! 4. Deep-merge the chain into one mapping
//! 5. Deserialize the mapping into `C::Layer` (with string coercion)
//! 6. Let confique fill defaults and validate required fields

use confique::Config;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::chain::SourceChain;
use crate::coerce::Coercing;
use crate::document::Document;
use crate::env::{self, Environment};
use crate::error::LayerfigError;
use crate::overrides;
use crate::profile;
use crate::template;
use crate::types::{ProfileKeys, ProfileSelection, Source};
use crate::validate;

/// The merged, not yet typed, configuration.
pub type MergedConfig = Map<String, Value>;

/// All pre-loaded data needed to resolve a config. No I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// The parsed config file (empty if there is none).
    pub document: Document,
    /// Which profile section applies.
    pub profile: ProfileSelection,
    /// Names of the reserved document keys.
    pub keys: ProfileKeys,
    /// Direct arguments as `(dotted_key, value)` pairs. Never templated.
    pub direct: Vec<(String, Value)>,
    /// Env var prefix for the `PREFIX__KEY` layer. `None` disables it.
    pub env_prefix: Option<String>,
}

/// Build the precedence chain, highest first.
pub fn build_chain(input: ResolveInput, env: &dyn Environment) -> SourceChain {
    let sections = profile::select(input.document, &input.profile, &input.keys, env);

    let mut chain = SourceChain::new();
    chain.push(Source::Direct, overrides::overrides_to_map(&input.direct));

    if let Some(prefix) = &input.env_prefix {
        chain.push(Source::Environment, env::env_to_map(prefix, env.vars()));
    }

    if let Some(name) = sections.profile_name {
        chain.push(Source::Profile(name), template::expand(sections.profile, env));
    }

    chain.push(Source::Global, template::expand(sections.global, env));

    debug!(
        sources = ?chain.contributions().iter().map(|c| c.source.to_string()).collect::<Vec<_>>(),
        "built source chain"
    );
    chain
}

/// Resolve pre-loaded inputs into the merged mapping.
pub fn resolve(input: ResolveInput, env: &dyn Environment) -> MergedConfig {
    build_chain(input, env).into_merged()
}

/// Decode a merged mapping into the config struct.
///
/// `Null` values are dropped first, so an explicit null leaves the field to
/// its `#[config(default)]` (or `None`). Missing required fields surface as
/// [`LayerfigError::ConfigError`].
pub fn decode<C: Config>(merged: MergedConfig) -> Result<C, LayerfigError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let pruned = validate::prune_nulls(merged);
    let layer = C::Layer::deserialize(Coercing(Value::Object(pruned))).map_err(|e| {
        LayerfigError::InvalidValue {
            key: "<merged>".into(),
            reason: e.to_string(),
        }
    })?;

    C::builder()
        .preloaded(layer)
        .load()
        .map_err(LayerfigError::from)
}

/// Build, optionally validate, merge and decode in one go.
pub fn resolve_typed<C: Config>(
    input: ResolveInput,
    env: &dyn Environment,
    strict: bool,
) -> Result<C, LayerfigError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let chain = build_chain(input, env);
    if strict {
        validate::validate_unknown_keys::<C>(&chain)?;
    }
    decode(chain.into_merged())
}
