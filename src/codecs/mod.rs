//! Builtin codec implementations.
//!
//! The generic family (json, text, binary) is always compiled. Array and
//! image codecs are feature-gated; their providers report a missing
//! dependency when the feature is off.

mod binary;
mod json;
mod text;

#[cfg(feature = "npy")]
mod npy;

#[cfg(feature = "png")]
mod png;

pub use binary::BinaryCodec;
pub use json::JsonCodec;
pub use text::{Charset, TextCodec};

#[cfg(feature = "npy")]
pub use npy::NpyCodec;

#[cfg(feature = "png")]
pub use self::png::PngCodec;
