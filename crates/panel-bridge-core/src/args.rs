//! Command argument maps
//!
//! Arguments arrive as an untyped JSON object. `Args` wraps that object and
//! offers typed accessors that produce `MissingArgument`/`InvalidArgument`
//! errors, so each command payload can be validated once at decode time.
//!
//! The runtime's Lua encoder cannot tell an empty object from an empty array,
//! so `[]` and `null` both decode as an empty argument map. Numbers sent as
//! strings (common from form inputs) are accepted wherever a number is expected.

use crate::error::{BridgeError, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Argument map of a single command
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Args(Map<String, Value>);

impl<'de> Deserialize<'de> for Args {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Args(map)),
            Value::Null => Ok(Args::default()),
            Value::Array(items) if items.is_empty() => Ok(Args::default()),
            other => Err(de::Error::custom(format!(
                "args must be an object, got {}",
                type_name(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for Args {
    fn from(map: Map<String, Value>) -> Self {
        Args(map)
    }
}

impl Args {
    /// Empty argument map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and the host CLI
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Raw value for a key; `null` counts as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Required non-empty string. Numbers are accepted and stringified.
    pub fn string(&self, key: &str) -> Result<String> {
        self.opt_string(key)?
            .ok_or_else(|| BridgeError::MissingArgument(key.to_string()))
    }

    pub fn opt_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(BridgeError::invalid(
                key,
                format!("expected string, got {}", type_name(other)),
            )),
        }
    }

    /// Required number
    pub fn number(&self, key: &str) -> Result<f64> {
        self.opt_number(key)?
            .ok_or_else(|| BridgeError::MissingArgument(key.to_string()))
    }

    pub fn opt_number(&self, key: &str) -> Result<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| BridgeError::invalid(key, "number out of range")),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| BridgeError::invalid(key, format!("expected number, got '{}'", s))),
            Some(other) => Err(BridgeError::invalid(
                key,
                format!("expected number, got {}", type_name(other)),
            )),
        }
    }

    /// Required integer; fractional numbers are rejected
    pub fn integer(&self, key: &str) -> Result<i64> {
        self.opt_integer(key)?
            .ok_or_else(|| BridgeError::MissingArgument(key.to_string()))
    }

    pub fn opt_integer(&self, key: &str) -> Result<Option<i64>> {
        match self.opt_number(key)? {
            None => Ok(None),
            Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Ok(Some(n as i64)),
            Some(n) => Err(BridgeError::invalid(
                key,
                format!("expected integer, got {}", n),
            )),
        }
    }

    /// Optional non-negative count with a default and an upper bound
    pub fn count(&self, key: &str, default: u32, max: u32) -> Result<u32> {
        match self.opt_integer(key)? {
            None => Ok(default),
            Some(n) if n < 1 => Err(BridgeError::invalid(key, "must be at least 1")),
            Some(n) if n > max as i64 => Err(BridgeError::invalid(
                key,
                format!("must be at most {}", max),
            )),
            Some(n) => Ok(n as u32),
        }
    }

    /// Required boolean. Accepts `true`/`false`, `1`/`0` and their string forms.
    pub fn flag(&self, key: &str) -> Result<bool> {
        self.opt_flag(key)?
            .ok_or_else(|| BridgeError::MissingArgument(key.to_string()))
    }

    pub fn opt_flag(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(0) => Ok(Some(false)),
                Some(1) => Ok(Some(true)),
                _ => Err(BridgeError::invalid(key, "expected boolean")),
            },
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" => Ok(Some(true)),
                "false" | "0" | "off" => Ok(Some(false)),
                _ => Err(BridgeError::invalid(
                    key,
                    format!("expected boolean, got '{}'", s),
                )),
            },
            Some(other) => Err(BridgeError::invalid(
                key,
                format!("expected boolean, got {}", type_name(other)),
            )),
        }
    }

    /// Required value of any JSON type
    pub fn value(&self, key: &str) -> Result<Value> {
        self.get(key)
            .cloned()
            .ok_or_else(|| BridgeError::MissingArgument(key.to_string()))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
