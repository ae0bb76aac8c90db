//! Raw binary items.

use crate::codec::sha256_hex;
use crate::{CodecError, ItemCodec, ItemValue, Limits, NativeType};

/// Identity codec for uninterpreted bytes.
#[derive(Clone, Debug, Default)]
pub struct BinaryCodec {
    limits: Limits,
}

impl BinaryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn bytes<'a>(&self, value: &'a ItemValue) -> Result<&'a [u8], CodecError> {
        value
            .as_bytes()
            .ok_or_else(|| CodecError::mismatch(self.name(), NativeType::Bytes, value.native_type()))
    }
}

impl ItemCodec for BinaryCodec {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Bytes
    }

    fn encode(&self, value: &ItemValue) -> Result<Vec<u8>, CodecError> {
        Ok(self.bytes(value)?.to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<ItemValue, CodecError> {
        self.limits.check_input(data.len())?;
        Ok(ItemValue::Bytes(data.to_vec()))
    }

    fn hash(&self, value: &ItemValue) -> Result<String, CodecError> {
        Ok(sha256_hex(self.bytes(value)?))
    }
}
