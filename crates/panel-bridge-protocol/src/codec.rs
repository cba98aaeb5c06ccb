//! Codec for the exchange files
//!
//! Files are plain JSON objects with a single list field (`commands`,
//! `results`) or a flat snapshot (`status`, `startup`). Decoding is lenient in
//! the ways the runtime's Lua encoder requires:
//! - empty or whitespace-only content is "no data", not an error
//! - an empty list may be written as `{}`
//! - ids may be numbers
//! - one malformed entry is skipped without discarding the rest of the list

use panel_bridge_core::{BridgeError, Command, CommandResult, Result, StartupInfo, StatusSnapshot};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Content of a cleared command file
pub const EMPTY_BATCH: &[u8] = br#"{"commands":[]}"#;

#[derive(Serialize)]
struct CommandBatch<'a> {
    commands: &'a [Command],
}

#[derive(Serialize)]
struct ResultLog<'a> {
    results: &'a [CommandResult],
}

/// Decode raw bytes into an untyped value; `None` for empty content
pub fn decode_value(bytes: &[u8]) -> Result<Option<Value>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(bytes)?;
    Ok(Some(value))
}

/// A command file as read, including entries that failed to decode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    pub commands: Vec<Command>,
    /// Raw entries in the list, malformed ones included
    pub entries: usize,
}

impl DecodedBatch {
    /// Entries skipped as malformed
    pub fn skipped(&self) -> usize {
        self.entries - self.commands.len()
    }
}

/// Decode `commands.json`
pub fn decode_commands(bytes: &[u8]) -> Result<Vec<Command>> {
    decode_list(bytes, "commands")
}

/// Decode `commands.json`, keeping count of the raw entries
pub fn decode_command_batch(bytes: &[u8]) -> Result<DecodedBatch> {
    let (commands, entries) = decode_entries(bytes, "commands")?;
    Ok(DecodedBatch { commands, entries })
}

/// Encode a command batch as a full file
pub fn encode_commands(commands: &[Command]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&CommandBatch { commands })?)
}

/// Decode `results.json`
pub fn decode_results(bytes: &[u8]) -> Result<Vec<CommandResult>> {
    decode_list(bytes, "results")
}

/// Encode the retained result log as a full file
pub fn encode_results(results: &[CommandResult]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&ResultLog { results })?)
}

/// Decode `status.json`; `None` for empty content
pub fn decode_status(bytes: &[u8]) -> Result<Option<StatusSnapshot>> {
    decode_snapshot(bytes)
}

pub fn encode_status(status: &StatusSnapshot) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(status)?)
}

/// Decode `startup.json`; `None` for empty content
pub fn decode_startup(bytes: &[u8]) -> Result<Option<StartupInfo>> {
    decode_snapshot(bytes)
}

pub fn encode_startup(info: &StartupInfo) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(info)?)
}

fn decode_snapshot<T: DeserializeOwned>(bytes: &[u8]) -> Result<Option<T>> {
    match decode_value(bytes)? {
        None => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

fn decode_list<T: DeserializeOwned>(bytes: &[u8], field: &str) -> Result<Vec<T>> {
    Ok(decode_entries(bytes, field)?.0)
}

/// Decoded entries of `field` and the raw length of the list
fn decode_entries<T: DeserializeOwned>(bytes: &[u8], field: &str) -> Result<(Vec<T>, usize)> {
    let Some(value) = decode_value(bytes)? else {
        return Ok((Vec::new(), 0));
    };

    let entries = match value {
        Value::Object(mut map) => match map.remove(field) {
            None | Some(Value::Null) => return Ok((Vec::new(), 0)),
            Some(Value::Array(items)) => items,
            Some(Value::Object(m)) if m.is_empty() => return Ok((Vec::new(), 0)),
            Some(_) => {
                return Err(BridgeError::DecodeFailure(format!(
                    "'{}' must be a list",
                    field
                )));
            }
        },
        _ => {
            return Err(BridgeError::DecodeFailure(
                "exchange file must contain an object".into(),
            ));
        }
    };

    let raw = entries.len();
    let mut decoded = Vec::with_capacity(raw);
    for (index, mut entry) in entries.into_iter().enumerate() {
        normalize_id(&mut entry);
        match serde_json::from_value::<T>(entry) {
            Ok(item) => decoded.push(item),
            Err(e) => warn!("Skipping malformed {} entry #{}: {}", field, index + 1, e),
        }
    }
    Ok((decoded, raw))
}

/// Numeric ids are accepted and turned into strings
fn normalize_id(entry: &mut Value) {
    if let Some(Value::Number(n)) = entry.get("id") {
        let id = n.to_string();
        entry["id"] = Value::String(id);
    }
}
