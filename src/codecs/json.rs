//! Structured JSON documents.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::codec::sha256_hex;
use crate::{CodecError, ItemCodec, ItemValue, Limits, NativeType};

/// JSON document codec.
///
/// Encodes indented with sorted keys and literal (unescaped) non-ASCII text.
/// The hash covers the compact sorted-key form, so layout never changes it.
#[derive(Clone, Debug)]
pub struct JsonCodec {
    indent: usize,
    limits: Limits,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self {
            indent: 4,
            limits: Limits::none(),
        }
    }

    /// Spaces per indentation level.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn document<'a>(&self, value: &'a ItemValue) -> Result<&'a Value, CodecError> {
        value
            .as_json()
            .ok_or_else(|| CodecError::mismatch(self.name(), NativeType::Mapping, value.native_type()))
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Mapping
    }

    fn encode(&self, value: &ItemValue) -> Result<Vec<u8>, CodecError> {
        let document = sorted(self.document(value)?);
        let indent = vec![b' '; self.indent];
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
        document.serialize(&mut serializer)?;
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<ItemValue, CodecError> {
        self.limits.check_input(data.len())?;
        Ok(ItemValue::Json(serde_json::from_slice(data)?))
    }

    fn hash(&self, value: &ItemValue) -> Result<String, CodecError> {
        let canonical = serde_json::to_vec(&sorted(self.document(value)?))?;
        Ok(sha256_hex(&canonical))
    }
}

/// Copy of `value` with every object's keys in sorted order.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sorted(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
