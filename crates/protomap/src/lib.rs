//! # protomap
//!
//! JSON mapping for records whose fields mix plain data, nested records and
//! protocol messages.
//!
//! Each record type is classified once (which fields are plain serde data,
//! which are protocol messages, which are nested records) and that plan is
//! reused for every encode and decode. Protocol-message fields are handed to a
//! [`MessageCodec`] and embedded verbatim, so their JSON form follows the
//! message codec's rules rather than serde's.
//!
//! ## Quick Start
//!
//! ```ignore
//! use protomap::prelude::*;
//!
//! #[derive(Debug, Default, ProtoMessage)]
//! #[proto(name = "acme.user.v1.Profile")]
//! pub struct Profile {
//!     pub bio: String,
//!     pub display_name: String,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! #[record(rename_all = "camelCase")]
//! pub struct User {
//!     pub user_id: i64,
//!     #[record(json = "nick,omitempty")]
//!     pub nickname: String,
//!     #[record(message)]
//!     pub profile: Option<Profile>,
//! }
//!
//! let encoder = ProtoJsonEncoder::new(MapperConfig::cached());
//! let bytes = encoder.encode(&user)?;
//!
//! let mut decoded = User::default();
//! ProtoJsonDecoder::new(DecoderOptions { cache: true }).decode(bytes, &mut decoded)?;
//! ```
//!
//! Code generated by the derives refers to `::protomap_core`, so crates
//! deriving `Record` or `ProtoMessage` depend on `protomap-core` directly.
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`protomap_core`] - Schema traits, classifier, traversals, cache, mapper
//! - [`protomap_macros`] - Derive macros (`Record`, `ProtoMessage`)
//! - [`protomap_transport`] - Encoder and decoder front-ends

// Re-export core types
pub use protomap_core::{
    ByteSource, CacheStats, ClassificationNode, Classifier, CodecError, DecodeTraversal,
    EncodeTraversal, ErrorKind, FieldCategory, FieldDecl, FieldMut, FieldRef, FieldShape,
    FieldSpec, JsonTree, Mapper, MapperCache, MapperConfig, MapperError, MapperResult,
    MessageCodec, MessageDescriptor, MessageField, MessageOptions, ProtoField, ProtoJsonCodec,
    ProtoMessage, Record, RecordDecl, RecordField, Schema, Target, TargetMut, TypeDescriptor,
    TypeKind, ValueField, is_default,
};

// Re-export macros
pub use protomap_macros::{ProtoMessage, Record};

// Re-export transport types
pub use protomap_transport::{
    Decoder, DecoderOptions, Encoder, JsonDecoder, JsonEncoder, ProtoJsonDecoder,
    ProtoJsonEncoder, StreamDecoder, StreamEncoder, WriteHook,
};

// Re-export common dependencies that record authors need
pub use serde;
pub use serde_json;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use protomap::prelude::*;` to import commonly used types.
///
/// This includes:
/// - Derives: `Record`, `ProtoMessage`
/// - Front-ends: `Encoder`, `Decoder` and their proto-JSON implementations
/// - Mapping: `Mapper`, `MapperConfig`, `MapperError`, `MapperResult`, `ErrorKind`
/// - Serde derives: `Serialize`, `Deserialize`
pub mod prelude {
    pub use crate::{
        Decoder, DecoderOptions, Encoder, ErrorKind, Mapper, MapperConfig, MapperError,
        MapperResult, ProtoJsonDecoder, ProtoJsonEncoder, ProtoMessage, Record,
    };

    // Serde derives (commonly needed for plain field types)
    pub use serde::{Deserialize, Serialize};
}
