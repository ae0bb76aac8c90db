//! # itemcodecs
//!
//! Codec registry for the items of a scientific data container.
//!
//! A container stores named items of different kinds: JSON metadata, text
//! logs, raw binary blobs, numeric arrays and images. The registry picks the
//! codec that encodes, decodes and hashes each item, either from the item's
//! suffix (`data/meas.json` -> `json`) or, when no suffix is known, from the
//! native type of the value being stored.
//!
//! Optional codec families are feature-gated. Enable only what you need:
//!
//! ```toml
//! [dependencies]
//! itemcodecs = { version = "0.1", default-features = false, features = ["npy"] }
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use itemcodecs::{global, ItemValue};
//! use serde_json::json;
//!
//! let registry = global();
//! let item = registry.item_from_value("meta.json", ItemValue::Json(json!({"x": 1})))?;
//! let bytes = item.encode()?;
//!
//! let loaded = registry.item_from_bytes("meta.json", &bytes)?;
//! assert_eq!(loaded.value(), item.value());
//! assert_eq!(loaded.hash()?, item.hash()?);
//! # Ok::<(), itemcodecs::CodecError>(())
//! ```
//!
//! Custom codecs implement [`ItemCodec`] and are added with
//! [`CodecRegistry::register`], or contributed by a [`CodecProvider`] passed
//! to [`Bootstrap`].

#![forbid(unsafe_code)]

mod array;
mod bootstrap;
mod codec;
mod codecs;
pub mod config;
mod error;
mod format;
mod limits;
mod pixel;
mod provider;
mod registry;
mod value;

pub use array::{DType, Element, NdArray};
pub use bootstrap::{global, try_global, Bootstrap};
pub use codec::{Capabilities, Capability, CodecRef, Item, ItemCodec};
pub use codecs::{BinaryCodec, Charset, JsonCodec, TextCodec};
pub use config::CodecConfig;
pub use error::{CodecError, MissingDependency, RegistryError};
pub use format::suffix_of;
pub use limits::Limits;
pub use pixel::{Gray, GrayAlpha, Img, ImgRef, ImgVec, PixelData, Rgb, Rgba};
pub use provider::{
    builtin_providers, CodecProvider, GenericProvider, ImageProvider, NumericProvider,
    Registration,
};
pub use registry::{CodecRegistry, CodecSpec};
pub use value::{ItemValue, NativeType};

#[cfg(feature = "npy")]
pub use codecs::NpyCodec;

#[cfg(feature = "png")]
pub use codecs::PngCodec;
