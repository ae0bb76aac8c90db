//! Error types for codec registration and item conversion.

use crate::codec::Capability;
use crate::codecs::Charset;
use crate::value::NativeType;

/// Errors raised by [`CodecRegistry::register`](crate::CodecRegistry::register)
/// and [`CodecRegistry::reclaim_default`](crate::CodecRegistry::reclaim_default).
///
/// A failed registration leaves the registry untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The codec does not provide one of `encode`, `decode`, `hash`.
    #[error("no method {capability}() in codec `{codec}` for suffix '{suffix}'")]
    ContractViolation {
        suffix: String,
        codec: &'static str,
        capability: Capability,
    },
    /// Alias target suffix has not been registered yet.
    #[error("cannot alias '{suffix}' to unknown suffix '{target}'")]
    UnknownAliasTarget { suffix: String, target: String },
    /// Aliases inherit type ownership and may not claim a default type.
    #[error("alias {suffix}:{target} with default type {native_type}")]
    ConflictingAliasBinding {
        suffix: String,
        target: String,
        native_type: NativeType,
    },
}

/// Errors raised while encoding, decoding or hashing one item.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The value handed to a codec is not of the codec's native type.
    #[error("codec `{codec}` expects {expected} values, got {found}")]
    TypeMismatch {
        codec: &'static str,
        expected: NativeType,
        found: NativeType,
    },
    /// Input bytes are malformed for the codec.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Text contains characters the configured charset cannot represent.
    #[error("text not representable in {charset}: {detail}")]
    Unencodable { charset: Charset, detail: String },
    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    /// No codec is registered for the item's suffix.
    #[error("no codec registered for suffix '{0}'")]
    UnknownSuffix(String),
    /// The item name has no suffix to pick a decoder by.
    #[error("item '{0}' has no suffix")]
    MissingSuffix(String),
    /// No suffix was usable and no default codec exists for the value.
    #[error("no default codec for {0} values")]
    NoDefaultCodec(NativeType),
    /// Hash self-check failed after an encode/decode round trip.
    #[error("codec `{codec}` changed content hash on round trip: {before} != {after}")]
    HashMismatch {
        codec: &'static str,
        before: String,
        after: String,
    },
    /// JSON (de)serialization failure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Underlying format library error.
    #[error("codec `{codec}` error: {source}")]
    Codec {
        codec: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CodecError {
    /// Wrap a format-library error.
    pub fn from_codec<E>(codec: &'static str, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CodecError::Codec {
            codec,
            source: Box::new(error),
        }
    }

    pub(crate) fn mismatch(codec: &'static str, expected: NativeType, found: NativeType) -> Self {
        CodecError::TypeMismatch {
            codec,
            expected,
            found,
        }
    }
}

/// An optional codec provider cannot be used in this build.
///
/// Reported by [`CodecProvider::probe`](crate::CodecProvider::probe) and
/// absorbed by [`Bootstrap`](crate::Bootstrap); it never reaches callers of
/// `build()`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("provider `{provider}` unavailable: missing {dependency}")]
pub struct MissingDependency {
    pub provider: &'static str,
    pub dependency: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_violation_names_capability() {
        let err = RegistryError::ContractViolation {
            suffix: "dat".into(),
            codec: "broken",
            capability: Capability::Hash,
        };
        assert_eq!(
            err.to_string(),
            "no method hash() in codec `broken` for suffix 'dat'"
        );
    }

    #[test]
    fn codec_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err = CodecError::from_codec("png", io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("short read"));
    }
}
