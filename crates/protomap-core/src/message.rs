//! Protocol message capability and the proto-JSON message codec
//!
//! Fields holding a [`ProtoMessage`] are never traversed by the mapper; their
//! JSON form is produced and consumed by a [`MessageCodec`]. [`ProtoJsonCodec`]
//! is the default codec and follows the protobuf JSON mapping rules over the
//! message's [`MessageDescriptor`].

use crate::tree::{JsonTree, is_zero_value};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during message encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unknown field {field:?} in {message}")]
    UnknownField { message: String, field: String },

    #[error("required field {field:?} not set in {message}")]
    MissingRequired { message: String, field: String },
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CodecError::Deserialization(err.to_string())
        } else {
            CodecError::Serialization(err.to_string())
        }
    }
}

/// Static description of a message field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoField {
    /// Field name as declared in the schema (snake_case)
    pub name: &'static str,
    /// lowerCamelCase JSON name
    pub json_name: &'static str,
    /// Must be populated unless partial messages are allowed
    pub required: bool,
}

/// Static description of a message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Fully qualified name, e.g. `acme.user.v1.Profile`
    pub full_name: &'static str,
    pub fields: &'static [ProtoField],
}

impl MessageDescriptor {
    /// Find a field by JSON name or proto name
    pub fn find(&self, key: &str) -> Option<&'static ProtoField> {
        self.fields
            .iter()
            .find(|f| f.json_name == key)
            .or_else(|| self.fields.iter().find(|f| f.name == key))
    }
}

/// The protocol-message capability.
///
/// Implemented by `#[derive(ProtoMessage)]`. Field values are exchanged as
/// generic JSON so any [`MessageCodec`] can drive a message without knowing its
/// concrete type.
pub trait ProtoMessage: Send + Sync {
    /// Static schema of this message
    fn descriptor(&self) -> &'static MessageDescriptor;

    /// Current value of the field named `name`, or `None` if no such field
    fn field_value(&self, name: &str) -> Result<Option<Value>, serde_json::Error>;

    /// Replace the field named `name`; returns `false` if no such field
    fn set_field_value(&mut self, name: &str, value: Value) -> Result<bool, serde_json::Error>;

    /// Reset every field to its default
    fn clear(&mut self);
}

/// A field slot that can hold a protocol message.
///
/// Implemented for every derived message type, and for `Option<M>` and
/// `Box<M>` of such types. `message_mut` allocates an unset `Option`.
pub trait MessageField: Send + Sync {
    /// The held message, or `None` when unset
    fn message(&self) -> Option<&dyn ProtoMessage>;

    /// The held message, allocating a default instance when unset
    fn message_mut(&mut self) -> &mut dyn ProtoMessage;
}

impl<M: MessageField + Default> MessageField for Option<M> {
    fn message(&self) -> Option<&dyn ProtoMessage> {
        self.as_ref().and_then(|m| m.message())
    }

    fn message_mut(&mut self) -> &mut dyn ProtoMessage {
        self.get_or_insert_with(M::default).message_mut()
    }
}

impl<M: MessageField> MessageField for Box<M> {
    fn message(&self) -> Option<&dyn ProtoMessage> {
        (**self).message()
    }

    fn message_mut(&mut self) -> &mut dyn ProtoMessage {
        (**self).message_mut()
    }
}

/// Options honored by a [`MessageCodec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageOptions {
    /// Ignore input keys that name no field (otherwise `UnknownField`)
    pub discard_unknown_fields: bool,
    /// Accept messages with unpopulated required fields
    pub allow_partial_messages: bool,
    /// Emit fields holding default values on encode
    pub emit_unpopulated: bool,
    /// Use proto field names instead of JSON names on encode
    pub use_proto_names: bool,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            discard_unknown_fields: true,
            allow_partial_messages: true,
            emit_unpopulated: false,
            use_proto_names: false,
        }
    }
}

/// Trait for opaque message encoding and decoding
pub trait MessageCodec: Send + Sync {
    /// Encode a message to JSON bytes
    fn encode(
        &self,
        message: &dyn ProtoMessage,
        options: &MessageOptions,
    ) -> Result<Vec<u8>, CodecError>;

    /// Decode JSON bytes into a message
    fn decode(
        &self,
        data: &[u8],
        message: &mut dyn ProtoMessage,
        options: &MessageOptions,
    ) -> Result<(), CodecError>;

    /// Get the content type for this codec
    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// Protobuf JSON mapping codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtoJsonCodec;

impl ProtoJsonCodec {
    /// Create a new proto-JSON codec
    pub fn new() -> Self {
        Self
    }
}

impl MessageCodec for ProtoJsonCodec {
    fn encode(
        &self,
        message: &dyn ProtoMessage,
        options: &MessageOptions,
    ) -> Result<Vec<u8>, CodecError> {
        let descriptor = message.descriptor();
        // Entries stay in descriptor order
        let mut entries = Vec::with_capacity(descriptor.fields.len());

        for field in descriptor.fields {
            let value = message
                .field_value(field.name)
                .map_err(|e| CodecError::Serialization(format!("{}: {e}", field.name)))?
                .unwrap_or(Value::Null);

            if is_zero_value(&value) {
                if field.required && !options.allow_partial_messages {
                    return Err(missing_required(descriptor, field));
                }
                if !options.emit_unpopulated {
                    continue;
                }
            }

            let key = if options.use_proto_names {
                field.name
            } else {
                field.json_name
            };
            entries.push((key.to_string(), JsonTree::Value(value)));
        }

        JsonTree::Object(entries)
            .to_vec()
            .map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn decode(
        &self,
        data: &[u8],
        message: &mut dyn ProtoMessage,
        options: &MessageOptions,
    ) -> Result<(), CodecError> {
        let descriptor = message.descriptor();
        let value: Value = serde_json::from_slice(data)?;
        let Value::Object(object) = value else {
            return Err(CodecError::InvalidFormat(format!(
                "expected a JSON object for {}",
                descriptor.full_name
            )));
        };

        message.clear();

        for (key, value) in object {
            let Some(field) = descriptor.find(&key) else {
                if options.discard_unknown_fields {
                    continue;
                }
                return Err(CodecError::UnknownField {
                    message: descriptor.full_name.to_string(),
                    field: key,
                });
            };
            if value.is_null() {
                continue;
            }
            let known = message.set_field_value(field.name, value).map_err(|e| {
                CodecError::Deserialization(format!(
                    "{}.{}: {e}",
                    descriptor.full_name, field.name
                ))
            })?;
            if !known {
                return Err(CodecError::UnknownField {
                    message: descriptor.full_name.to_string(),
                    field: key,
                });
            }
        }

        if !options.allow_partial_messages {
            for field in descriptor.fields.iter().filter(|f| f.required) {
                let populated = message
                    .field_value(field.name)
                    .map_err(|e| CodecError::Serialization(e.to_string()))?
                    .is_some_and(|v| !is_zero_value(&v));
                if !populated {
                    return Err(missing_required(descriptor, field));
                }
            }
        }

        Ok(())
    }
}

fn missing_required(descriptor: &MessageDescriptor, field: &ProtoField) -> CodecError {
    CodecError::MissingRequired {
        message: descriptor.full_name.to_string(),
        field: field.name.to_string(),
    }
}
