//! Mapper configuration types

use crate::message::MessageOptions;
use serde::{Deserialize, Serialize};

/// Mapper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Share classifications through the process-wide cache
    #[serde(default)]
    pub cache: bool,

    /// Ignore unknown keys inside opaque messages
    #[serde(default = "default_true")]
    pub discard_unknown_fields: bool,

    /// Accept opaque messages with unpopulated required fields
    #[serde(default = "default_true")]
    pub allow_partial_messages: bool,

    /// Emit default-valued fields of opaque messages
    #[serde(default)]
    pub emit_unpopulated: bool,

    /// Key opaque message fields by proto name instead of JSON name
    #[serde(default)]
    pub use_proto_names: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            cache: false,
            discard_unknown_fields: default_true(),
            allow_partial_messages: default_true(),
            emit_unpopulated: false,
            use_proto_names: false,
        }
    }
}

impl MapperConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with the classification cache enabled
    pub fn cached() -> Self {
        Self {
            cache: true,
            ..Self::default()
        }
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Options handed to the message codec
    pub fn message_options(&self) -> MessageOptions {
        MessageOptions {
            discard_unknown_fields: self.discard_unknown_fields,
            allow_partial_messages: self.allow_partial_messages,
            emit_unpopulated: self.emit_unpopulated,
            use_proto_names: self.use_proto_names,
        }
    }
}
