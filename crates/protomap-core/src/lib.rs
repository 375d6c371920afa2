//! protomap-core - Classification, traversal and caching for JSON mapping
//!
//! This crate converts between JSON and typed records whose fields mix plain
//! data, protocol messages and nested records:
//! - [`Classifier`] builds a [`ClassificationNode`] per record type
//! - [`EncodeTraversal`] / [`DecodeTraversal`] apply a node to live values
//! - [`MessageCodec`] handles protocol-message fields opaquely
//! - [`MapperCache`] shares classifications process-wide
//! - [`Mapper`] ties configuration, codec and cache together

mod cache;
mod classify;
mod config;
mod decode;
mod encode;
mod error;
mod mapper;
mod message;
mod schema;
mod source;
mod tree;

pub use cache::{CacheStats, MapperCache};
pub use classify::{ClassificationNode, Classifier, FieldCategory, FieldSpec};
pub use config::MapperConfig;
pub use decode::DecodeTraversal;
pub use encode::EncodeTraversal;
pub use error::{ErrorKind, MapperError, MapperResult};
pub use mapper::Mapper;
pub use message::{
    CodecError, MessageCodec, MessageDescriptor, MessageField, MessageOptions, ProtoField,
    ProtoJsonCodec, ProtoMessage,
};
pub use schema::{
    FieldDecl, FieldMut, FieldRef, FieldShape, Record, RecordDecl, RecordField, Schema, Target,
    TargetMut, TypeDescriptor, TypeKind, ValueField, is_default,
};
pub use source::ByteSource;
pub use tree::{JsonTree, is_zero_value};

/// Re-exports used by derive-generated code
#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ByteSource, ClassificationNode, CodecError, ErrorKind, JsonTree, Mapper, MapperCache,
        MapperConfig, MapperError, MapperResult, MessageCodec, MessageOptions, ProtoJsonCodec,
        ProtoMessage, Record, Schema,
    };
}

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod lib_tests;
