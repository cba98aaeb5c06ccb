//! Serde helpers for tables written by a Lua encoder
//!
//! Lua has a single table type, so an empty list is encoded as `{}`.

use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize a list that may have been encoded as an empty object
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        other => Err(serde::de::Error::custom(format!(
            "expected list, got {}",
            other
        ))),
    }
}
