//! The ordered list of contributions, highest precedence first.

use serde_json::{Map, Value};

use crate::merge::merge_chain;
use crate::types::Source;

/// One source's opinion: keys present override lower sources, keys absent
/// defer to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub source: Source,
    pub values: Map<String, Value>,
}

/// Contributions in precedence order (index 0 wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceChain {
    contributions: Vec<Contribution>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contribution below everything already in the chain.
    pub fn push(&mut self, source: Source, values: Map<String, Value>) {
        self.contributions.push(Contribution { source, values });
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// The source whose value for the dotted key survives the merge, if any.
    ///
    /// A key is supplied by the highest contribution that has a non-mapping
    /// value at that path. For a mapping-valued path the answer is the
    /// highest contribution that has it at all. A non-mapping value (`Null`
    /// included) at a parent path removes the key from the merged result.
    pub fn origin_of(&self, dotted_key: &str) -> Option<&Source> {
        let mut first_mapping = None;
        for c in &self.contributions {
            match lookup(&c.values, dotted_key) {
                Lookup::Found(Value::Object(_)) => {
                    first_mapping.get_or_insert(&c.source);
                }
                // A scalar above any mapping wins outright.
                Lookup::Found(_) if first_mapping.is_none() => return Some(&c.source),
                // Everything below a scalar or a masked parent is merged away.
                Lookup::Found(_) | Lookup::Blocked => break,
                Lookup::Absent => {}
            }
        }
        first_mapping
    }

    /// Deep-merge all contributions into one mapping.
    pub fn merge(&self) -> Map<String, Value> {
        merge_chain(self.contributions.iter().map(|c| c.values.clone()).collect::<Vec<_>>())
    }

    pub fn into_merged(self) -> Map<String, Value> {
        merge_chain(self.contributions.into_iter().map(|c| c.values).collect::<Vec<_>>())
    }
}

enum Lookup<'a> {
    Found(&'a Value),
    Absent,
    /// A parent path holds a non-mapping value.
    Blocked,
}

fn lookup<'a>(map: &'a Map<String, Value>, dotted_key: &str) -> Lookup<'a> {
    let mut current: Option<&'a Value> = None;
    for segment in dotted_key.split('.') {
        let next = match current {
            None => map.get(segment),
            Some(Value::Object(nested)) => nested.get(segment),
            Some(_) => return Lookup::Blocked,
        };
        match next {
            Some(value) => current = Some(value),
            None => return Lookup::Absent,
        }
    }
    current.map_or(Lookup::Absent, Lookup::Found)
}
