//! Command results

use crate::command::CommandId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Payload of a successful result
pub type Data = Map<String, Value>;

/// Outcome of one dispatched command, as stored in `results.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub id: CommandId,
    pub success: bool,
    #[serde(default, deserialize_with = "lua_object")]
    pub data: Option<Data>,
    #[serde(default)]
    pub error: Option<String>,
    /// Unix time in milliseconds
    #[serde(default)]
    pub timestamp: u64,
}

impl CommandResult {
    pub fn success(id: impl Into<CommandId>, data: Data, timestamp: u64) -> Self {
        Self {
            id: id.into(),
            success: true,
            data: Some(data),
            error: None,
            timestamp,
        }
    }

    pub fn failure(id: impl Into<CommandId>, error: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id: id.into(),
            success: false,
            data: None,
            error: Some(error.into()),
            timestamp,
        }
    }

    /// Field of the data payload, if any
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}

/// `data` written by a Lua encoder may be `[]` for an empty table
fn lua_object<'de, D>(deserializer: D) -> Result<Option<Data>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Array(items)) if items.is_empty() => Ok(Some(Map::new())),
        Some(other) => {
            // Scalars and lists are wrapped rather than rejected
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Ok(Some(map))
        }
    }
}
