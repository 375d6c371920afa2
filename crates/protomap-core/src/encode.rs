//! Encode traversal: live value + classification node -> [`JsonTree`]

use crate::classify::{ClassificationNode, FieldCategory, FieldSpec};
use crate::error::{MapperError, MapperResult};
use crate::message::{MessageCodec, MessageOptions, ProtoMessage};
use crate::schema::{FieldRef, Record, Target};
use crate::tree::JsonTree;
use tracing::trace;

/// Walks a classification node over a live value, delegating opaque fields
/// to the message codec.
pub struct EncodeTraversal<'a> {
    codec: &'a dyn MessageCodec,
    options: &'a MessageOptions,
}

impl<'a> EncodeTraversal<'a> {
    pub fn new(codec: &'a dyn MessageCodec, options: &'a MessageOptions) -> Self {
        Self { codec, options }
    }

    /// Encode `target` according to `node`
    pub fn encode(&self, node: &ClassificationNode, target: Target<'_>) -> MapperResult<JsonTree> {
        trace!(record = node.type_name(), "encoding");
        match (node.is_opaque(), target) {
            (true, Target::Message(message)) => self.encode_message(message),
            (false, Target::Record(record)) => self.encode_record(node, record),
            _ => Err(MapperError::TargetMismatch {
                type_name: node.type_name(),
            }),
        }
    }

    fn encode_message(&self, message: &dyn ProtoMessage) -> MapperResult<JsonTree> {
        let bytes = self.codec.encode(message, self.options)?;
        Ok(JsonTree::raw(bytes)?)
    }

    fn encode_record(
        &self,
        node: &ClassificationNode,
        record: &dyn Record,
    ) -> MapperResult<JsonTree> {
        let mut entries = Vec::with_capacity(node.fields().len());

        for spec in node.fields() {
            // Optional fields are tested on the live value when the record
            // can answer, otherwise on the encoded tree
            let live_zero = if spec.is_optional() {
                record.field_is_zero(spec.internal_name())
            } else {
                Some(false)
            };
            if live_zero == Some(true) {
                continue;
            }

            let tree = self
                .encode_field(node, spec, record)
                .map_err(|e| e.at_field(spec.external_name()))?;

            if live_zero.is_none() && tree.is_zero() {
                continue;
            }
            entries.push((spec.external_name().to_string(), tree));
        }

        Ok(JsonTree::Object(entries))
    }

    fn encode_field(
        &self,
        node: &ClassificationNode,
        spec: &FieldSpec,
        record: &dyn Record,
    ) -> MapperResult<JsonTree> {
        let name = spec.internal_name();
        let field = record
            .field(name)
            .ok_or_else(|| MapperError::FieldNotHandled(name.to_string()))?;

        match (spec.category(), field) {
            (FieldCategory::Regular, FieldRef::Value(value)) => value
                .to_json_value()
                .map(JsonTree::Value)
                .map_err(MapperError::InvalidValue),
            (FieldCategory::Opaque, FieldRef::Message(Some(message))) => {
                self.encode_message(message)
            }
            (FieldCategory::Opaque, FieldRef::Message(None))
            | (FieldCategory::Nested, FieldRef::Record(None)) => Ok(JsonTree::null()),
            (FieldCategory::Opaque, _) => Err(MapperError::FieldNotProtoMessage(name.to_string())),
            (FieldCategory::Nested, FieldRef::Record(Some(inner))) => {
                let child = node
                    .child(name)
                    .ok_or_else(|| MapperError::FieldNotHandled(name.to_string()))?;
                self.encode_record(child, inner)
            }
            _ => Err(MapperError::FieldNotHandled(name.to_string())),
        }
    }
}
