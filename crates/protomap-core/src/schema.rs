//! Schema traits and type descriptors
//!
//! Record layouts are declared at compile time by `#[derive(Record)]` and
//! `#[derive(ProtoMessage)]`. A [`TypeDescriptor`] is the static metadata the
//! classifier consumes; [`Record`] gives the traversals by-name access to a live
//! value's fields.

use crate::message::{MessageField, ProtoMessage};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::TypeId;

/// Static metadata for a record or message type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub type_id: TypeId,
    /// Short type name used in diagnostics
    pub type_name: &'static str,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Descriptor for a field-structured record type
    pub fn record<T: 'static>(type_name: &'static str, decl: RecordDecl) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name,
            kind: TypeKind::Record(decl),
        }
    }

    /// Descriptor for a type handled entirely by the message codec
    pub fn message<T: 'static>(type_name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name,
            kind: TypeKind::Message,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self.kind, TypeKind::Message)
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Message,
    Record(RecordDecl),
}

/// Declared fields of a record, in declaration order
#[derive(Debug, Clone, Default)]
pub struct RecordDecl {
    /// Container-level renaming rule, e.g. `camelCase`
    pub rename_all: Option<&'static str>,
    pub fields: Vec<FieldDecl>,
}

impl RecordDecl {
    pub fn new(fields: Vec<FieldDecl>) -> Self {
        Self {
            rename_all: None,
            fields,
        }
    }

    pub fn rename_all(mut self, rule: &'static str) -> Self {
        self.rename_all = Some(rule);
        self
    }
}

/// One declared field
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Rust identifier, also the key passed to [`Record::field`]
    pub ident: &'static str,
    /// Explicit external name
    pub rename: Option<&'static str>,
    /// Raw naming annotation in `name[,option]*` form
    pub tag: Option<&'static str>,
    pub optional: bool,
    pub shape: FieldShape,
}

/// Static shape of a field's type
#[derive(Debug, Clone, Copy)]
pub enum FieldShape {
    /// Plain serde data
    Value,
    /// A protocol message slot
    Message,
    /// A nested record slot; the function describes the record type
    Record(fn() -> TypeDescriptor),
}

impl FieldDecl {
    fn with_shape(ident: &'static str, shape: FieldShape) -> Self {
        Self {
            ident,
            rename: None,
            tag: None,
            optional: false,
            shape,
        }
    }

    pub fn value(ident: &'static str) -> Self {
        Self::with_shape(ident, FieldShape::Value)
    }

    pub fn message(ident: &'static str) -> Self {
        Self::with_shape(ident, FieldShape::Message)
    }

    pub fn nested<R: RecordField>(ident: &'static str) -> Self {
        Self::with_shape(ident, FieldShape::Record(R::record_descriptor))
    }

    pub fn renamed(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    pub fn tagged(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A type the mapper can encode and decode
pub trait Schema: Send + Sync + 'static {
    /// Static metadata consumed by the classifier
    fn descriptor() -> TypeDescriptor
    where
        Self: Sized;

    fn as_target(&self) -> Target<'_>;

    fn as_target_mut(&mut self) -> TargetMut<'_>;
}

/// Borrowed view of a [`Schema`] value
pub enum Target<'a> {
    Record(&'a dyn Record),
    Message(&'a dyn ProtoMessage),
}

/// Mutable view of a [`Schema`] value
pub enum TargetMut<'a> {
    Record(&'a mut dyn Record),
    Message(&'a mut dyn ProtoMessage),
}

/// By-name field access on a live record value
pub trait Record: Send + Sync {
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>>;

    /// Whether the named field holds its type's default value.
    ///
    /// Encode consults this for optional fields before looking at the
    /// encoded JSON. `None` means the record cannot tell, and the encoded
    /// tree is tested instead.
    fn field_is_zero(&self, name: &str) -> Option<bool> {
        let _ = name;
        None
    }
}

/// Whether `value` equals `T::default()`
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// Borrowed field of a record
pub enum FieldRef<'a> {
    Value(&'a dyn ValueField),
    /// `None` when an optional message slot is unset
    Message(Option<&'a dyn ProtoMessage>),
    /// `None` when an optional record slot is unset
    Record(Option<&'a dyn Record>),
}

/// Mutable field of a record
pub enum FieldMut<'a> {
    Value(&'a mut dyn ValueField),
    Message(&'a mut dyn MessageField),
    Record(&'a mut dyn RecordField),
}

/// Plain serde data held in a regular field
pub trait ValueField: Send + Sync {
    fn to_json_value(&self) -> Result<Value, serde_json::Error>;

    fn set_json_value(&mut self, value: Value) -> Result<(), serde_json::Error>;
}

impl<T> ValueField for T
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn set_json_value(&mut self, value: Value) -> Result<(), serde_json::Error> {
        *self = serde_json::from_value(value)?;
        Ok(())
    }
}

/// A field slot that can hold a nested record.
///
/// Implemented for every derived record type, and for `Option<R>` and
/// `Box<R>` of such types. `record_mut` allocates an unset `Option`.
pub trait RecordField: Send + Sync {
    fn record(&self) -> Option<&dyn Record>;

    fn record_mut(&mut self) -> &mut dyn Record;

    fn record_descriptor() -> TypeDescriptor
    where
        Self: Sized;
}

impl<R: RecordField + Default> RecordField for Option<R> {
    fn record(&self) -> Option<&dyn Record> {
        self.as_ref().and_then(|r| r.record())
    }

    fn record_mut(&mut self) -> &mut dyn Record {
        self.get_or_insert_with(R::default).record_mut()
    }

    fn record_descriptor() -> TypeDescriptor {
        R::record_descriptor()
    }
}

impl<R: RecordField> RecordField for Box<R> {
    fn record(&self) -> Option<&dyn Record> {
        (**self).record()
    }

    fn record_mut(&mut self) -> &mut dyn Record {
        (**self).record_mut()
    }

    fn record_descriptor() -> TypeDescriptor {
        R::record_descriptor()
    }
}

#[cfg(test)]
#[path = "schema/schema_tests.rs"]
mod schema_tests;
