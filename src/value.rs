//! Native in-memory values held by items.

use core::fmt;

use crate::array::NdArray;
use crate::pixel::PixelData;

/// In-memory value category a codec natively handles.
///
/// Used to pick a default codec when an item has no usable suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NativeType {
    /// Structured JSON document. The default for this type is protected
    /// once claimed, see [`CodecRegistry::register`](crate::CodecRegistry::register).
    Mapping,
    /// Unicode text.
    Text,
    /// Raw uninterpreted bytes.
    Bytes,
    /// Numeric n-dimensional array.
    Array,
    /// Pixel buffer.
    Image,
}

impl NativeType {
    /// All native types in declaration order.
    pub const ALL: [NativeType; 5] = [
        NativeType::Mapping,
        NativeType::Text,
        NativeType::Bytes,
        NativeType::Array,
        NativeType::Image,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NativeType::Mapping => "mapping",
            NativeType::Text => "text",
            NativeType::Bytes => "bytes",
            NativeType::Array => "array",
            NativeType::Image => "image",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A native value stored in or loaded from one container item.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemValue {
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
    Array(NdArray),
    Image(PixelData),
}

impl ItemValue {
    pub fn native_type(&self) -> NativeType {
        match self {
            ItemValue::Json(_) => NativeType::Mapping,
            ItemValue::Text(_) => NativeType::Text,
            ItemValue::Bytes(_) => NativeType::Bytes,
            ItemValue::Array(_) => NativeType::Array,
            ItemValue::Image(_) => NativeType::Image,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ItemValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ItemValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ItemValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            ItemValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&PixelData> {
        match self {
            ItemValue::Image(p) => Some(p),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ItemValue {
    fn from(value: serde_json::Value) -> Self {
        ItemValue::Json(value)
    }
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        ItemValue::Text(value)
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        ItemValue::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for ItemValue {
    fn from(value: Vec<u8>) -> Self {
        ItemValue::Bytes(value)
    }
}

impl From<NdArray> for ItemValue {
    fn from(value: NdArray) -> Self {
        ItemValue::Array(value)
    }
}

impl From<PixelData> for ItemValue {
    fn from(value: PixelData) -> Self {
        ItemValue::Image(value)
    }
}
