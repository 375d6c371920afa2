//! Mapper: configuration, message codec and classification cache in one handle

use crate::cache::MapperCache;
use crate::classify::ClassificationNode;
use crate::config::MapperConfig;
use crate::decode::DecodeTraversal;
use crate::encode::EncodeTraversal;
use crate::error::{MapperError, MapperResult};
use crate::message::{MessageCodec, MessageOptions, ProtoJsonCodec};
use crate::schema::Schema;
use crate::tree::JsonTree;
use std::sync::Arc;

/// Encodes and decodes [`Schema`] types.
///
/// With `cache` enabled in the config, classifications come from the global
/// [`MapperCache`] (or one injected with [`Mapper::with_cache`]); otherwise
/// every call classifies afresh.
#[derive(Clone)]
pub struct Mapper {
    config: MapperConfig,
    options: MessageOptions,
    codec: Arc<dyn MessageCodec>,
    cache: Option<Arc<MapperCache>>,
}

impl Mapper {
    /// Create a mapper using the proto-JSON message codec
    pub fn new(config: MapperConfig) -> Self {
        let cache = config.cache.then(MapperCache::global);
        Self {
            options: config.message_options(),
            config,
            codec: Arc::new(ProtoJsonCodec::new()),
            cache,
        }
    }

    /// Replace the message codec
    pub fn with_codec(mut self, codec: Arc<dyn MessageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Use a specific cache instead of the global one
    pub fn with_cache(mut self, cache: Arc<MapperCache>) -> Self {
        self.config.cache = true;
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<MapperCache>> {
        self.cache.as_ref()
    }

    /// Classification of `T`
    pub fn node_for<T: Schema>(&self) -> MapperResult<Arc<ClassificationNode>> {
        match &self.cache {
            Some(cache) => cache.get_or_build::<T>(),
            None => ClassificationNode::of::<T>().map(Arc::new),
        }
    }

    /// Encode `body` to a JSON tree without serializing it
    pub fn precompute<T: Schema>(&self, body: &T) -> MapperResult<JsonTree> {
        let node = self.node_for::<T>()?;
        EncodeTraversal::new(self.codec.as_ref(), &self.options).encode(&node, body.as_target())
    }

    /// Encode `body` to compact JSON bytes
    pub fn encode<T: Schema>(&self, body: &T) -> MapperResult<Vec<u8>> {
        self.precompute(body)?
            .to_vec()
            .map_err(MapperError::InvalidValue)
    }

    /// Encode `body` to indented JSON bytes
    pub fn encode_pretty<T: Schema>(&self, body: &T) -> MapperResult<Vec<u8>> {
        self.precompute(body)?
            .to_vec_pretty()
            .map_err(MapperError::InvalidValue)
    }

    /// Decode `data` into an existing value
    pub fn decode<T: Schema>(&self, data: &[u8], dest: &mut T) -> MapperResult<()> {
        let node = self.node_for::<T>()?;
        DecodeTraversal::new(self.codec.as_ref(), &self.options).decode(
            &node,
            data,
            dest.as_target_mut(),
        )
    }

    /// Decode `data` into a fresh default value
    pub fn decode_new<T: Schema + Default>(&self, data: &[u8]) -> MapperResult<T> {
        let mut dest = T::default();
        self.decode(data, &mut dest)?;
        Ok(dest)
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("config", &self.config)
            .field("content_type", &self.codec.content_type())
            .field("cache", &self.cache)
            .finish()
    }
}
