//! Blueprints
//!
//!     The locale-independent output handed to the block builder: a literal, a list, or a map
//!     with `type`, `fields` and `children` keys for an actual block. A deferred entry marks a
//!     child that was not available when the blueprint was made; it serializes as `"%k"` so a
//!     later pass can fill it in.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blueprint {
    Literal(String),
    List(Vec<Blueprint>),
    /// Entries in template order
    Map(Vec<(String, Blueprint)>),
    /// Child `k` (one-based) is still missing
    Deferred(usize),
}

impl Blueprint {
    pub fn literal(text: impl Into<String>) -> Self {
        Blueprint::Literal(text.into())
    }

    /// Lists and maps.
    pub fn is_structural(&self) -> bool {
        matches!(self, Blueprint::List(_) | Blueprint::Map(_))
    }

    /// Text form of a literal or deferred entry.
    pub fn literal_form(&self) -> Option<String> {
        match self {
            Blueprint::Literal(text) => Some(text.clone()),
            Blueprint::Deferred(k) => Some(format!("%{}", k)),
            Blueprint::List(_) | Blueprint::Map(_) => None,
        }
    }

    /// Map entry by key.
    pub fn get(&self, key: &str) -> Option<&Blueprint> {
        match self {
            Blueprint::Map(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// The `type` entry of a block blueprint.
    pub fn block_type(&self) -> Option<&str> {
        match self.get("type") {
            Some(Blueprint::Literal(kind)) => Some(kind.as_str()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for Blueprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Blueprint::Literal(text) => serializer.serialize_str(text),
            Blueprint::Deferred(k) => serializer.serialize_str(&format!("%{}", k)),
            Blueprint::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Blueprint::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Compact JSON.
impl fmt::Display for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}
