//! Byte source normalization for decoders

use crate::error::{MapperError, MapperResult};
use std::any::Any;
use std::borrow::Cow;
use std::io::{Cursor, Read};

/// Input accepted by decoders: in-memory bytes or a reader.
pub enum ByteSource<'a> {
    Bytes(Cow<'a, [u8]>),
    Reader(Box<dyn Read + 'a>),
}

impl<'a> ByteSource<'a> {
    /// Wrap a reader
    pub fn from_reader<R: Read + 'a>(reader: R) -> Self {
        ByteSource::Reader(Box::new(reader))
    }

    /// Normalize a dynamically typed input.
    ///
    /// Accepts `String`, `Vec<u8>`, `&'static str`, `&'static [u8]` and
    /// `Box<dyn Read + Send>`; anything else fails with `InvalidSourceType`.
    pub fn from_any(value: Box<dyn Any>) -> MapperResult<ByteSource<'static>> {
        let value = match value.downcast::<String>() {
            Ok(text) => return Ok(ByteSource::from(*text)),
            Err(value) => value,
        };
        let value = match value.downcast::<Vec<u8>>() {
            Ok(bytes) => return Ok(ByteSource::from(*bytes)),
            Err(value) => value,
        };
        let value = match value.downcast::<&'static str>() {
            Ok(text) => return Ok(ByteSource::from(*text)),
            Err(value) => value,
        };
        let value = match value.downcast::<&'static [u8]>() {
            Ok(bytes) => return Ok(ByteSource::from(*bytes)),
            Err(value) => value,
        };
        match value.downcast::<Box<dyn Read + Send>>() {
            Ok(reader) => Ok(ByteSource::Reader(*reader)),
            Err(_) => Err(MapperError::InvalidSourceType(
                "expected a reader, string, or byte sequence".to_string(),
            )),
        }
    }

    /// Whether the source is known to hold no bytes
    pub fn is_empty(&self) -> bool {
        match self {
            ByteSource::Bytes(bytes) => bytes.is_empty(),
            ByteSource::Reader(_) => false,
        }
    }

    /// Buffer the whole source
    pub fn read_all(self) -> MapperResult<Cow<'a, [u8]>> {
        match self {
            ByteSource::Bytes(bytes) => Ok(bytes),
            ByteSource::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(Cow::Owned(buf))
            }
        }
    }

    /// View the source as a reader
    pub fn into_reader(self) -> Box<dyn Read + 'a> {
        match self {
            ByteSource::Bytes(bytes) => Box::new(Cursor::new(bytes)),
            ByteSource::Reader(reader) => reader,
        }
    }
}

impl<'a> From<&'a [u8]> for ByteSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ByteSource::Bytes(Cow::Borrowed(bytes))
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ByteSource<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        ByteSource::Bytes(Cow::Borrowed(bytes.as_slice()))
    }
}

impl<'a> From<&'a str> for ByteSource<'a> {
    fn from(text: &'a str) -> Self {
        ByteSource::Bytes(Cow::Borrowed(text.as_bytes()))
    }
}

impl<'a> From<&'a String> for ByteSource<'a> {
    fn from(text: &'a String) -> Self {
        ByteSource::from(text.as_str())
    }
}

impl<'a> From<&'a Vec<u8>> for ByteSource<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        ByteSource::from(bytes.as_slice())
    }
}

impl From<Vec<u8>> for ByteSource<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        ByteSource::Bytes(Cow::Owned(bytes))
    }
}

impl From<String> for ByteSource<'static> {
    fn from(text: String) -> Self {
        ByteSource::Bytes(Cow::Owned(text.into_bytes()))
    }
}

impl std::fmt::Debug for ByteSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteSource::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ByteSource::Reader(_) => f.write_str("Reader"),
        }
    }
}
