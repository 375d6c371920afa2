//! Encoded JSON tree with pre-encoded message segments

use crate::message::CodecError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use serde_json::value::RawValue;

/// Output of the encode traversal, ready for generic JSON serialization.
///
/// `Raw` segments hold JSON produced by the message codec; they are written
/// verbatim by `serde_json` and never re-escaped. `Object` keeps entries in
/// field declaration order.
#[derive(Debug, Clone)]
pub enum JsonTree {
    Value(Value),
    Raw(Box<RawValue>),
    Object(Vec<(String, JsonTree)>),
}

impl JsonTree {
    /// Wrap codec output as a pre-encoded segment
    pub fn raw(bytes: Vec<u8>) -> Result<Self, CodecError> {
        let text = String::from_utf8(bytes)
            .map_err(|e| CodecError::InvalidFormat(format!("codec output is not UTF-8: {e}")))?;
        RawValue::from_string(text)
            .map(JsonTree::Raw)
            .map_err(|e| CodecError::InvalidFormat(format!("codec output is not JSON: {e}")))
    }

    /// The JSON `null` tree
    pub fn null() -> Self {
        JsonTree::Value(Value::Null)
    }

    /// Whether this tree encodes a zero value (see [`is_zero_value`])
    ///
    /// An object of nested fields is zero when every entry is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            JsonTree::Value(value) => is_zero_value(value),
            JsonTree::Raw(raw) => is_zero_raw(raw),
            JsonTree::Object(entries) => entries.iter().all(|(_, tree)| tree.is_zero()),
        }
    }

    /// Look up an entry of an `Object` tree by external name
    pub fn get(&self, key: &str) -> Option<&JsonTree> {
        match self {
            JsonTree::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Serialize to compact JSON bytes
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Serialize to indented JSON bytes
    pub fn to_vec_pretty(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    /// Convert to a generic JSON value, parsing any raw segments
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for JsonTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonTree::Value(value) => value.serialize(serializer),
            JsonTree::Raw(raw) => raw.serialize(serializer),
            JsonTree::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, tree) in entries {
                    map.serialize_entry(key, tree)?;
                }
                map.end()
            }
        }
    }
}

/// Zero-value test used for optional-field omission and unpopulated message fields
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` are zero.
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn is_zero_raw(raw: &RawValue) -> bool {
    let text = raw.get().trim();
    match text {
        "null" | "false" | "\"\"" => return true,
        _ if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) => {
            return text.parse::<f64>().is_ok_and(|n| n == 0.0);
        }
        _ => {}
    }
    let empty_between = |open: char, close: char| {
        text.strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
            .is_some_and(|inner| inner.trim().is_empty())
    };
    empty_between('{', '}') || empty_between('[', ']')
}
