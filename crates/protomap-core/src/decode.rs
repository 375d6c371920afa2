//! Decode traversal: JSON bytes + classification node -> live value

use crate::classify::{ClassificationNode, FieldCategory, FieldSpec};
use crate::error::{MapperError, MapperResult};
use crate::message::{MessageCodec, MessageOptions};
use crate::schema::{FieldMut, FieldRef, Record, TargetMut};
use serde::de::{Error as _, Unexpected};
use serde_json::{Map, Value};
use tracing::trace;

/// Walks a classification node over parsed JSON, populating a live value and
/// delegating opaque fields to the message codec.
///
/// Field shapes are checked against the input before anything is written, so a
/// mismatch leaves the destination untouched. Keys naming no field are ignored.
pub struct DecodeTraversal<'a> {
    codec: &'a dyn MessageCodec,
    options: &'a MessageOptions,
}

impl<'a> DecodeTraversal<'a> {
    pub fn new(codec: &'a dyn MessageCodec, options: &'a MessageOptions) -> Self {
        Self { codec, options }
    }

    /// Decode `data` into `target` according to `node`
    pub fn decode(
        &self,
        node: &ClassificationNode,
        data: &[u8],
        target: TargetMut<'_>,
    ) -> MapperResult<()> {
        trace!(record = node.type_name(), bytes = data.len(), "decoding");
        match (node.is_opaque(), target) {
            (true, TargetMut::Message(message)) => {
                self.codec.decode(data, message, self.options)?;
                Ok(())
            }
            (false, TargetMut::Record(record)) => {
                let value: Value = serde_json::from_slice(data).map_err(MapperError::MalformedJson)?;
                let Some(object) = as_object(value)? else {
                    return Ok(());
                };
                preflight(node, &object, &*record)?;
                self.decode_object(node, object, record)
            }
            _ => Err(MapperError::TargetMismatch {
                type_name: node.type_name(),
            }),
        }
    }

    fn decode_object(
        &self,
        node: &ClassificationNode,
        mut object: Map<String, Value>,
        record: &mut dyn Record,
    ) -> MapperResult<()> {
        for spec in node.fields() {
            let Some(value) = object.remove(spec.external_name()) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            self.decode_field(node, spec, value, record)
                .map_err(|e| e.at_field(spec.external_name()))?;
        }
        Ok(())
    }

    fn decode_field(
        &self,
        node: &ClassificationNode,
        spec: &FieldSpec,
        value: Value,
        record: &mut dyn Record,
    ) -> MapperResult<()> {
        let name = spec.internal_name();
        let field = record
            .field_mut(name)
            .ok_or_else(|| MapperError::FieldNotHandled(name.to_string()))?;

        match (spec.category(), field) {
            (FieldCategory::Regular, FieldMut::Value(slot)) => {
                slot.set_json_value(value).map_err(MapperError::InvalidValue)
            }
            (FieldCategory::Opaque, FieldMut::Message(slot)) => {
                let bytes = serde_json::to_vec(&value).map_err(MapperError::InvalidValue)?;
                self.codec.decode(&bytes, slot.message_mut(), self.options)?;
                Ok(())
            }
            (FieldCategory::Opaque, _) => Err(MapperError::FieldNotProtoMessage(name.to_string())),
            (FieldCategory::Nested, FieldMut::Record(slot)) => {
                let child = node
                    .child(name)
                    .ok_or_else(|| MapperError::FieldNotHandled(name.to_string()))?;
                match as_object(value)? {
                    Some(object) => self.decode_object(child, object, slot.record_mut()),
                    None => Ok(()),
                }
            }
            _ => Err(MapperError::FieldNotHandled(name.to_string())),
        }
    }
}

/// Check accessor/category agreement for every field present in `object`,
/// descending into nested records that already exist.
fn preflight(
    node: &ClassificationNode,
    object: &Map<String, Value>,
    record: &dyn Record,
) -> MapperResult<()> {
    for spec in node.fields() {
        let Some(value) = object.get(spec.external_name()) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        preflight_field(node, spec, value, record).map_err(|e| e.at_field(spec.external_name()))?;
    }
    Ok(())
}

fn preflight_field(
    node: &ClassificationNode,
    spec: &FieldSpec,
    value: &Value,
    record: &dyn Record,
) -> MapperResult<()> {
    let name = spec.internal_name();
    let field = record
        .field(name)
        .ok_or_else(|| MapperError::FieldNotHandled(name.to_string()))?;

    match (spec.category(), field) {
        (FieldCategory::Regular, FieldRef::Value(_)) => Ok(()),
        (FieldCategory::Opaque, FieldRef::Message(_)) => Ok(()),
        (FieldCategory::Opaque, _) => Err(MapperError::FieldNotProtoMessage(name.to_string())),
        (FieldCategory::Nested, FieldRef::Record(inner)) => {
            let child = node
                .child(name)
                .ok_or_else(|| MapperError::FieldNotHandled(name.to_string()))?;
            let Value::Object(object) = value else {
                return Err(MapperError::MalformedJson(not_an_object(value)));
            };
            match inner {
                Some(inner) => preflight(child, object, inner),
                None => Ok(()),
            }
        }
        _ => Err(MapperError::FieldNotHandled(name.to_string())),
    }
}

/// Unwrap a JSON object; `null` yields `None`
fn as_object(value: Value) -> MapperResult<Option<Map<String, Value>>> {
    match value {
        Value::Object(object) => Ok(Some(object)),
        Value::Null => Ok(None),
        other => Err(MapperError::MalformedJson(not_an_object(&other))),
    }
}

fn not_an_object(value: &Value) -> serde_json::Error {
    let unexpected = match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    };
    serde_json::Error::invalid_type(unexpected, &"a JSON object")
}
