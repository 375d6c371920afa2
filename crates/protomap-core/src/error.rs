//! Error types for protomap mapping operations

use crate::message::CodecError;
use thiserror::Error;

/// Result type alias for mapping operations
pub type MapperResult<T> = Result<T, MapperError>;

/// Discriminant of a [`MapperError`], stable across field-path wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NilInput,
    InvalidSourceType,
    MalformedJson,
    TagParse,
    DuplicateName,
    FieldNotProtoMessage,
    FieldNotHandled,
    CycleDetected,
    TargetMismatch,
    InvalidValue,
    Codec,
    Io,
}

/// Error type for classification, encoding and decoding
#[derive(Error, Debug)]
pub enum MapperError {
    /// A required input (body, instance, destination) was missing or empty
    #[error("{0} cannot be nil")]
    NilInput(&'static str),

    /// A value could not be turned into a byte source
    #[error("invalid source type: {0}")]
    InvalidSourceType(String),

    /// Input bytes were not valid JSON, or not a JSON object where one is required
    #[error("malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// A naming annotation could not be parsed
    #[error("invalid tag {tag:?} on {target}: {reason}")]
    TagParse {
        target: String,
        tag: String,
        reason: String,
    },

    /// Two fields of one record resolve to the same external name
    #[error("duplicate JSON name {name:?} in {record}")]
    DuplicateName { record: &'static str, name: String },

    /// A field classified as a protocol message does not expose one
    #[error("field is not a proto message: {0}")]
    FieldNotProtoMessage(String),

    /// A field's accessor disagrees with its classification
    #[error("field not handled: {0}")]
    FieldNotHandled(String),

    /// A record type nests itself, directly or transitively
    #[error("cycle detected: {}", .path.join(" -> "))]
    CycleDetected { path: Vec<&'static str> },

    /// A value's shape (record vs message) disagrees with its classification
    #[error("{type_name} does not match its classification")]
    TargetMismatch { type_name: &'static str },

    /// A regular field value could not be converted to or from JSON
    #[error("invalid value: {0}")]
    InvalidValue(#[source] serde_json::Error),

    /// Error reported by the opaque message codec, passed through unchanged
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Reading from a byte source or writing to a sink failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error raised while processing a field, with the wire path leading to it
    #[error("{path}: {source}")]
    Field {
        path: String,
        #[source]
        source: Box<MapperError>,
    },
}

impl MapperError {
    /// The kind of the underlying error, looking through field-path wrappers
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapperError::NilInput(_) => ErrorKind::NilInput,
            MapperError::InvalidSourceType(_) => ErrorKind::InvalidSourceType,
            MapperError::MalformedJson(_) => ErrorKind::MalformedJson,
            MapperError::TagParse { .. } => ErrorKind::TagParse,
            MapperError::DuplicateName { .. } => ErrorKind::DuplicateName,
            MapperError::FieldNotProtoMessage(_) => ErrorKind::FieldNotProtoMessage,
            MapperError::FieldNotHandled(_) => ErrorKind::FieldNotHandled,
            MapperError::CycleDetected { .. } => ErrorKind::CycleDetected,
            MapperError::TargetMismatch { .. } => ErrorKind::TargetMismatch,
            MapperError::InvalidValue(_) => ErrorKind::InvalidValue,
            MapperError::Codec(_) => ErrorKind::Codec,
            MapperError::Io(_) => ErrorKind::Io,
            MapperError::Field { source, .. } => source.kind(),
        }
    }

    /// Dotted wire path of the field the error originated in, if any
    pub fn field_path(&self) -> Option<&str> {
        match self {
            MapperError::Field { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The innermost error with all field-path wrappers removed
    pub fn root_cause(&self) -> &MapperError {
        match self {
            MapperError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Prefix the error's field path with `name`
    pub(crate) fn at_field(self, name: &str) -> Self {
        match self {
            MapperError::Field { path, source } => MapperError::Field {
                path: format!("{name}.{path}"),
                source,
            },
            other => MapperError::Field {
                path: name.to_string(),
                source: Box::new(other),
            },
        }
    }
}
