//! Configuration for the builtin codecs.
//!
//! A [`CodecConfig`] is handed to every provider during bootstrap, so one
//! value controls text charsets, JSON layout, PNG compression and decode
//! limits for the whole registry.

use crate::codecs::Charset;
use crate::Limits;

/// PNG configuration types from png crate.
#[cfg(feature = "png")]
pub mod png_codec {
    pub use png::{Compression, Filter};
}

/// Settings applied to the builtin codecs when a registry is bootstrapped.
///
/// # Example
///
/// ```
/// use itemcodecs::{Bootstrap, Charset, CodecConfig};
///
/// let config = CodecConfig::default()
///     .with_text_charset(Charset::Latin1)
///     .with_json_indent(2);
/// let registry = Bootstrap::with_config(config).build()?;
/// assert!(registry.contains_suffix("txt"));
/// # Ok::<(), itemcodecs::RegistryError>(())
/// ```
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct CodecConfig {
    /// Charset of text items (`txt`, `log`, `pgm`).
    pub text_charset: Charset,

    /// Spaces per indentation level of encoded JSON items.
    pub json_indent: usize,

    /// PNG compression level.
    #[cfg(feature = "png")]
    pub png_compression: png::Compression,

    /// PNG filter strategy.
    #[cfg(feature = "png")]
    pub png_filter: png::Filter,

    /// Limits enforced by decoders.
    pub limits: Limits,

    /// Re-decode every encoded item and compare content hashes.
    pub verify_hash: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            text_charset: Charset::Utf8,
            json_indent: 4,
            #[cfg(feature = "png")]
            png_compression: png::Compression::default(),
            #[cfg(feature = "png")]
            png_filter: png::Filter::default(),
            limits: Limits::none(),
            verify_hash: false,
        }
    }
}

impl CodecConfig {
    pub fn with_text_charset(mut self, charset: Charset) -> Self {
        self.text_charset = charset;
        self
    }

    pub fn with_json_indent(mut self, indent: usize) -> Self {
        self.json_indent = indent;
        self
    }

    #[cfg(feature = "png")]
    pub fn with_png_compression(mut self, compression: png::Compression) -> Self {
        self.png_compression = compression;
        self
    }

    #[cfg(feature = "png")]
    pub fn with_png_filter(mut self, filter: png::Filter) -> Self {
        self.png_filter = filter;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Enable the encode-time hash self-check, see [`Item::encode`](crate::Item::encode).
    pub fn with_verify_hash(mut self, verify: bool) -> Self {
        self.verify_hash = verify;
        self
    }
}
