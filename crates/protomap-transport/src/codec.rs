//! Encoder/decoder traits and their JSON implementations

use protomap_core::{
    ByteSource, JsonTree, Mapper, MapperConfig, MapperError, MapperResult, Schema,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::io::{Read, Write};
use tracing::trace;

/// Callback run before the first byte is written, e.g. to send headers
pub type WriteHook<'a> = Option<&'a mut dyn FnMut() -> MapperResult<()>>;

/// Trait for encoding request or response bodies
pub trait Encoder<T: ?Sized>: Send + Sync {
    /// Encode a body to bytes
    fn encode(&self, body: &T) -> MapperResult<Vec<u8>>;

    /// Encode a body, run `before_write`, then write the bytes.
    ///
    /// Nothing is written and the hook is not run when encoding fails.
    fn encode_and_write(
        &self,
        writer: &mut dyn Write,
        before_write: WriteHook<'_>,
        body: &T,
    ) -> MapperResult<()> {
        let bytes = self.encode(body)?;
        if let Some(hook) = before_write {
            hook()?;
        }
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Get the content type for this encoder
    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// Trait for decoding request or response bodies
pub trait Decoder<T: ?Sized>: Send + Sync {
    /// Decode a normalized byte source into `dest`
    fn decode_source(&self, source: ByteSource<'_>, dest: &mut T) -> MapperResult<()>;

    /// Decode text, bytes or a [`ByteSource`] into `dest`
    fn decode<'a>(&self, source: impl Into<ByteSource<'a>>, dest: &mut T) -> MapperResult<()>
    where
        Self: Sized,
    {
        self.decode_source(source.into(), dest)
    }

    /// Decode everything a reader yields into `dest`
    fn decode_reader(&self, reader: impl Read, dest: &mut T) -> MapperResult<()>
    where
        Self: Sized,
    {
        self.decode_source(ByteSource::from_reader(reader), dest)
    }
}

/// Buffer a source and reject empty bodies
fn read_body<'a>(source: ByteSource<'a>) -> MapperResult<std::borrow::Cow<'a, [u8]>> {
    let bytes = source.read_all()?;
    if bytes.is_empty() {
        return Err(MapperError::NilInput("body"));
    }
    Ok(bytes)
}

// ============================================================================
// Plain JSON
// ============================================================================

/// JSON encoder using serde_json
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    /// Whether to pretty-print output (default: false for efficiency)
    pretty: bool,
}

impl JsonEncoder {
    /// Create a new JSON encoder
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Create a JSON encoder that pretty-prints output
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl<T: Serialize> Encoder<T> for JsonEncoder {
    fn encode(&self, body: &T) -> MapperResult<Vec<u8>> {
        if self.pretty {
            serde_json::to_vec_pretty(body).map_err(MapperError::InvalidValue)
        } else {
            serde_json::to_vec(body).map_err(MapperError::InvalidValue)
        }
    }
}

/// JSON decoder that buffers the whole body before parsing
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl<T: DeserializeOwned> Decoder<T> for JsonDecoder {
    fn decode_source(&self, source: ByteSource<'_>, dest: &mut T) -> MapperResult<()> {
        let bytes = read_body(source)?;
        *dest = serde_json::from_slice(&bytes).map_err(MapperError::MalformedJson)?;
        Ok(())
    }
}

// ============================================================================
// Streaming JSON
// ============================================================================

/// JSON encoder that serializes straight into the writer.
///
/// Each body is followed by a newline, so consecutive writes form a
/// newline-delimited stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamEncoder;

impl StreamEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Serialize> Encoder<T> for StreamEncoder {
    fn encode(&self, body: &T) -> MapperResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec(body).map_err(MapperError::InvalidValue)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Runs `before_write` first; a serialization failure may leave a
    /// partial body in the writer.
    fn encode_and_write(
        &self,
        writer: &mut dyn Write,
        before_write: WriteHook<'_>,
        body: &T,
    ) -> MapperResult<()> {
        if let Some(hook) = before_write {
            hook()?;
        }
        serde_json::to_writer(&mut *writer, body).map_err(|e| {
            if e.is_io() {
                MapperError::Io(e.into())
            } else {
                MapperError::InvalidValue(e)
            }
        })?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// JSON decoder that parses the first value straight from the source
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamDecoder;

impl StreamDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl<T: DeserializeOwned> Decoder<T> for StreamDecoder {
    fn decode_source(&self, source: ByteSource<'_>, dest: &mut T) -> MapperResult<()> {
        let reader = source.into_reader();
        let mut values = serde_json::Deserializer::from_reader(reader).into_iter::<T>();
        match values.next() {
            Some(Ok(value)) => {
                *dest = value;
                Ok(())
            }
            Some(Err(e)) if e.is_io() => Err(MapperError::Io(e.into())),
            Some(Err(e)) => Err(MapperError::MalformedJson(e)),
            None => Err(MapperError::NilInput("body")),
        }
    }
}

// ============================================================================
// Proto-JSON
// ============================================================================

/// Encoder for records mixing plain data and protocol messages
#[derive(Debug, Clone, Default)]
pub struct ProtoJsonEncoder {
    mapper: Mapper,
    pretty: bool,
}

impl ProtoJsonEncoder {
    /// Create an encoder from mapper configuration
    pub fn new(config: MapperConfig) -> Self {
        Self::from_mapper(Mapper::new(config))
    }

    /// Create an encoder around an existing mapper
    pub fn from_mapper(mapper: Mapper) -> Self {
        Self {
            mapper,
            pretty: false,
        }
    }

    /// Pretty-print output
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Encode a body to a JSON tree without serializing it
    pub fn precompute<T: Schema>(&self, body: &T) -> MapperResult<JsonTree> {
        self.mapper.precompute(body)
    }
}

impl<T: Schema> Encoder<T> for ProtoJsonEncoder {
    fn encode(&self, body: &T) -> MapperResult<Vec<u8>> {
        if self.pretty {
            self.mapper.encode_pretty(body)
        } else {
            self.mapper.encode(body)
        }
    }
}

/// Options for [`ProtoJsonDecoder`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderOptions {
    /// Share classifications through the process-wide cache
    #[serde(default)]
    pub cache: bool,
}

/// Decoder for records mixing plain data and protocol messages
#[derive(Debug, Clone, Default)]
pub struct ProtoJsonDecoder {
    mapper: Mapper,
}

impl ProtoJsonDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self::from_mapper(Mapper::new(MapperConfig {
            cache: options.cache,
            ..MapperConfig::default()
        }))
    }

    /// Create a decoder around an existing mapper
    pub fn from_mapper(mapper: Mapper) -> Self {
        Self { mapper }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }
}

impl<T: Schema> Decoder<T> for ProtoJsonDecoder {
    fn decode_source(&self, source: ByteSource<'_>, dest: &mut T) -> MapperResult<()> {
        let bytes = read_body(source)?;
        trace!(bytes = bytes.len(), "decoding proto-json body");
        self.mapper.decode(&bytes, dest)
    }
}
