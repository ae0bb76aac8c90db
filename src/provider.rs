//! Codec providers discovered at bootstrap.
//!
//! Each provider contributes an ordered list of `(suffix, codec, native type)`
//! registrations. Optional providers report through [`CodecProvider::probe`]
//! whether their backing crate was compiled in.

use crate::codecs::{BinaryCodec, JsonCodec, TextCodec};
use crate::registry::CodecSpec;
use crate::{CodecConfig, MissingDependency, NativeType};

/// One `(suffix, codec, native type)` triple.
#[derive(Clone, Debug)]
pub struct Registration {
    pub suffix: String,
    pub codec: CodecSpec,
    pub native_type: Option<NativeType>,
}

impl Registration {
    pub fn new(
        suffix: impl Into<String>,
        codec: impl Into<CodecSpec>,
        native_type: Option<NativeType>,
    ) -> Self {
        Self {
            suffix: suffix.into(),
            codec: codec.into(),
            native_type,
        }
    }

    /// Register `suffix` with the codec already registered for `target`.
    pub fn alias(suffix: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(suffix, CodecSpec::alias(target), None)
    }
}

/// Source of codec registrations.
pub trait CodecProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the provider can be used in this build.
    fn probe(&self) -> Result<(), MissingDependency> {
        Ok(())
    }

    /// Registrations in the order they must be applied.
    fn registrations(&self, config: &CodecConfig) -> Vec<Registration>;
}

/// JSON, text and binary items. Always available.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericProvider;

impl CodecProvider for GenericProvider {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn registrations(&self, config: &CodecConfig) -> Vec<Registration> {
        let json = JsonCodec::new()
            .with_indent(config.json_indent)
            .with_limits(config.limits.clone());
        let text = TextCodec::new()
            .with_charset(config.text_charset)
            .with_limits(config.limits.clone());
        let binary = BinaryCodec::new().with_limits(config.limits.clone());
        vec![
            Registration::new("json", CodecSpec::codec(json), Some(NativeType::Mapping)),
            Registration::new("txt", CodecSpec::codec(text), Some(NativeType::Text)),
            Registration::alias("log", "txt"),
            Registration::alias("pgm", "txt"),
            Registration::new("bin", CodecSpec::codec(binary), Some(NativeType::Bytes)),
        ]
    }
}

/// PNG images, backed by the `png` feature.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageProvider;

impl CodecProvider for ImageProvider {
    fn name(&self) -> &'static str {
        "image"
    }

    fn probe(&self) -> Result<(), MissingDependency> {
        if cfg!(feature = "png") {
            Ok(())
        } else {
            Err(MissingDependency {
                provider: self.name(),
                dependency: "png",
            })
        }
    }

    #[cfg(feature = "png")]
    fn registrations(&self, config: &CodecConfig) -> Vec<Registration> {
        let png = crate::codecs::PngCodec::new()
            .with_compression(config.png_compression)
            .with_filter(config.png_filter)
            .with_limits(config.limits.clone());
        vec![Registration::new(
            "png",
            CodecSpec::codec(png),
            Some(NativeType::Image),
        )]
    }

    #[cfg(not(feature = "png"))]
    fn registrations(&self, _config: &CodecConfig) -> Vec<Registration> {
        Vec::new()
    }
}

/// NumPy arrays, backed by the `npy` feature.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumericProvider;

impl CodecProvider for NumericProvider {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn probe(&self) -> Result<(), MissingDependency> {
        if cfg!(feature = "npy") {
            Ok(())
        } else {
            Err(MissingDependency {
                provider: self.name(),
                dependency: "npy",
            })
        }
    }

    #[cfg(feature = "npy")]
    fn registrations(&self, config: &CodecConfig) -> Vec<Registration> {
        let npy = crate::codecs::NpyCodec::new().with_limits(config.limits.clone());
        vec![Registration::new(
            "npy",
            CodecSpec::codec(npy),
            Some(NativeType::Array),
        )]
    }

    #[cfg(not(feature = "npy"))]
    fn registrations(&self, _config: &CodecConfig) -> Vec<Registration> {
        Vec::new()
    }
}

/// Builtin providers in discovery order.
pub fn builtin_providers() -> Vec<Box<dyn CodecProvider>> {
    vec![
        Box::new(GenericProvider),
        Box::new(ImageProvider),
        Box::new(NumericProvider),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_registrations_in_order() {
        let regs = GenericProvider.registrations(&CodecConfig::default());
        let suffixes: Vec<_> = regs.iter().map(|r| r.suffix.as_str()).collect();
        assert_eq!(suffixes, ["json", "txt", "log", "pgm", "bin"]);
        assert!(matches!(&regs[2].codec, CodecSpec::Alias(t) if t == "txt"));
        assert_eq!(regs[0].native_type, Some(NativeType::Mapping));
        assert_eq!(regs[3].native_type, None);
    }

    #[test]
    fn probes_follow_features() {
        assert!(GenericProvider.probe().is_ok());
        assert_eq!(ImageProvider.probe().is_ok(), cfg!(feature = "png"));
        assert_eq!(NumericProvider.probe().is_ok(), cfg!(feature = "npy"));
    }

    #[test]
    fn discovery_order() {
        let names: Vec<_> = builtin_providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["generic", "image", "numeric"]);
    }
}
