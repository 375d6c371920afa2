//! protomap-transport - JSON encoders and decoders
//!
//! This crate provides:
//! - [`Encoder`] and [`Decoder`] traits for writing and reading request bodies
//! - [`JsonEncoder`] / [`JsonDecoder`] for plain serde JSON
//! - [`StreamEncoder`] / [`StreamDecoder`] for writer- and reader-based JSON
//! - [`ProtoJsonEncoder`] / [`ProtoJsonDecoder`] for records mixing plain data
//!   and protocol messages

mod codec;

pub use codec::{
    Decoder, DecoderOptions, Encoder, JsonDecoder, JsonEncoder, ProtoJsonDecoder,
    ProtoJsonEncoder, StreamDecoder, StreamEncoder, WriteHook,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Decoder, DecoderOptions, Encoder, JsonDecoder, JsonEncoder, ProtoJsonDecoder,
        ProtoJsonEncoder, StreamDecoder, StreamEncoder,
    };
}
