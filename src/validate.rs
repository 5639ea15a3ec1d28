//! Strict-mode validation: detect keys the config struct doesn't know.
//!
//! Uses `serde_ignored` to deserialize each contribution into `C::Layer`
//! (all-optional fields) and capture any keys that the layer doesn't consume.
//! Checking contributions one by one lets each unknown key name the source
//! it came from.

use confique::Config;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::chain::SourceChain;
use crate::coerce::Coercing;
use crate::error::LayerfigError;

/// Validate that no contribution in `chain` has keys unknown to `C`.
pub fn validate_unknown_keys<C: Config>(chain: &SourceChain) -> Result<(), LayerfigError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let mut errors = Vec::new();

    for contribution in chain.contributions() {
        let mut unknown_keys: Vec<String> = Vec::new();
        let values = prune_nulls(contribution.values.clone());

        let _layer: C::Layer = serde_ignored::deserialize(Coercing(Value::Object(values)), |path| {
            unknown_keys.push(path.to_string());
        })
        .map_err(|e| LayerfigError::InvalidValue {
            key: format!("<{}>", contribution.source),
            reason: e.to_string(),
        })?;

        errors.extend(unknown_keys.into_iter().map(|key| LayerfigError::UnknownKey {
            key,
            origin: contribution.source.to_string(),
        }));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(LayerfigError::UnknownKeys(errors))
    }
}

/// Drop `Null` entries from mappings, recursively.
///
/// After merging, a `Null` has done its job of masking lower sources; the
/// config struct should then see the field as unset.
pub fn prune_nulls(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::Object(nested) => Some((key, Value::Object(prune_nulls(nested)))),
            other => Some((key, other)),
        })
        .collect()
}
