//! The codec contract and per-item codec instances.

use core::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::{CodecError, ItemValue, NativeType};

/// Shared handle to a registered codec. Identity is the allocation.
pub type CodecRef = Arc<dyn ItemCodec>;

/// One of the three operations every codec must provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Encode,
    Decode,
    Hash,
}

impl Capability {
    /// Required capabilities in check order.
    pub const REQUIRED: [Capability; 3] = [Capability::Encode, Capability::Decode, Capability::Hash];

    pub fn name(self) -> &'static str {
        match self {
            Capability::Encode => "encode",
            Capability::Decode => "decode",
            Capability::Hash => "hash",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operations a codec implementation supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub encode: bool,
    pub decode: bool,
    pub hash: bool,
}

impl Capabilities {
    pub const FULL: Self = Self {
        encode: true,
        decode: true,
        hash: true,
    };

    pub fn supports(self, capability: Capability) -> bool {
        match capability {
            Capability::Encode => self.encode,
            Capability::Decode => self.decode,
            Capability::Hash => self.hash,
        }
    }

    /// First required capability that is not supported.
    pub fn first_missing(self) -> Option<Capability> {
        Capability::REQUIRED
            .into_iter()
            .find(|&c| !self.supports(c))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

/// Conversion between one item format and its native value.
///
/// Codecs are stateless apart from their configuration and are shared
/// process-wide as [`CodecRef`]. Implementations must uphold two laws:
///
/// - `decode(encode(v))` is semantically equal to `v`.
/// - Semantically equal values hash identically, even when their encoded
///   bytes differ (compression level, indentation, byte order). Hash a
///   canonical form of the value, never the encoded bytes.
pub trait ItemCodec: Send + Sync + 'static {
    /// Stable name for logs and errors.
    fn name(&self) -> &'static str;

    /// Native type of the values this codec holds.
    fn native_type(&self) -> NativeType;

    /// Operations this implementation provides. Registration rejects codecs
    /// that lack any of them.
    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    /// Serialize a value to bytes.
    fn encode(&self, value: &ItemValue) -> Result<Vec<u8>, CodecError>;

    /// Parse bytes back into a value.
    fn decode(&self, data: &[u8]) -> Result<ItemValue, CodecError>;

    /// Lowercase hex SHA-256 fingerprint of the value's content.
    fn hash(&self, value: &ItemValue) -> Result<String, CodecError>;
}

/// A codec bound to one value for the duration of a read or write.
pub struct Item {
    codec: CodecRef,
    value: ItemValue,
    verify_hash: bool,
}

impl Item {
    /// Wrap a value. Fails if the value is not of the codec's native type.
    pub fn new(codec: CodecRef, value: ItemValue) -> Result<Self, CodecError> {
        let found = value.native_type();
        if found != codec.native_type() {
            return Err(CodecError::mismatch(codec.name(), codec.native_type(), found));
        }
        Ok(Self {
            codec,
            value,
            verify_hash: false,
        })
    }

    /// Decode bytes into a new item.
    pub fn decode(codec: CodecRef, data: &[u8]) -> Result<Self, CodecError> {
        let value = codec.decode(data)?;
        tracing::trace!(codec = codec.name(), len = data.len(), "decoded item");
        Ok(Self {
            codec,
            value,
            verify_hash: false,
        })
    }

    /// Re-decode encoded output and compare hashes on every [`encode`](Self::encode).
    pub fn with_hash_check(mut self, verify: bool) -> Self {
        self.verify_hash = verify;
        self
    }

    /// Encode the held value.
    ///
    /// With the hash check enabled, the output is decoded again and must
    /// hash like the held value, otherwise [`CodecError::HashMismatch`].
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let data = self.codec.encode(&self.value)?;
        tracing::trace!(codec = self.codec.name(), len = data.len(), "encoded item");
        if self.verify_hash {
            let before = self.codec.hash(&self.value)?;
            let after = self.codec.hash(&self.codec.decode(&data)?)?;
            if before != after {
                return Err(CodecError::HashMismatch {
                    codec: self.codec.name(),
                    before,
                    after,
                });
            }
        }
        Ok(data)
    }

    pub fn hash(&self) -> Result<String, CodecError> {
        self.codec.hash(&self.value)
    }

    pub fn codec(&self) -> &CodecRef {
        &self.codec
    }

    pub fn value(&self) -> &ItemValue {
        &self.value
    }

    pub fn into_value(self) -> ItemValue {
        self.value
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("codec", &self.codec.name())
            .field("value", &self.value)
            .field("verify_hash", &self.verify_hash)
            .finish()
    }
}

/// Incremental SHA-256 over a canonical value representation.
#[cfg(any(feature = "npy", feature = "png"))]
pub(crate) struct ContentHasher(Sha256);

#[cfg(any(feature = "npy", feature = "png"))]
impl ContentHasher {
    pub(crate) fn new() -> Self {
        Self(Sha256::new())
    }

    pub(crate) fn update(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.update(bytes);
        self
    }

    /// Length-prefixed field, so adjacent fields cannot run together.
    pub(crate) fn field(&mut self, bytes: &[u8]) -> &mut Self {
        self.update(&(bytes.len() as u64).to_le_bytes()).update(bytes)
    }

    pub(crate) fn finish(self) -> String {
        hex::encode(self.0.finalize())
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
