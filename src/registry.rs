//! Suffix and native-type codec registry.

use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::format::suffix_of;
use crate::{CodecError, CodecRef, Item, ItemCodec, ItemValue, NativeType, RegistryError};

/// Codec argument of [`CodecRegistry::register`].
#[derive(Clone)]
pub enum CodecSpec {
    /// A concrete codec implementation.
    Codec(CodecRef),
    /// Reuse the codec already registered for this suffix.
    Alias(String),
}

impl CodecSpec {
    pub fn codec<C: ItemCodec>(codec: C) -> Self {
        CodecSpec::Codec(Arc::new(codec))
    }

    pub fn alias(target: impl Into<String>) -> Self {
        CodecSpec::Alias(target.into())
    }
}

impl From<CodecRef> for CodecSpec {
    fn from(codec: CodecRef) -> Self {
        CodecSpec::Codec(codec)
    }
}

impl From<&str> for CodecSpec {
    fn from(target: &str) -> Self {
        CodecSpec::Alias(target.to_owned())
    }
}

impl From<String> for CodecSpec {
    fn from(target: String) -> Self {
        CodecSpec::Alias(target)
    }
}

impl fmt::Debug for CodecSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecSpec::Codec(codec) => f.debug_tuple("Codec").field(&codec.name()).finish(),
            CodecSpec::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
        }
    }
}

/// Codec lookup tables consumed by the container.
///
/// Holds three tables: suffix to codec, native type to default codec, and
/// every distinct codec in the order it was first registered. Every codec in
/// the tables passed the capability check at registration.
///
/// Usually built once by [`Bootstrap`](crate::Bootstrap) and then only read.
/// Registering more codecs needs `&mut self`, so concurrent readers always see
/// a consistent snapshot.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    suffixes: BTreeMap<String, CodecRef>,
    types: BTreeMap<NativeType, CodecRef>,
    known: Vec<CodecRef>,
    verify_hash: bool,
}

impl CodecRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a suffix.
    ///
    /// `codec` is either a concrete codec or the name of an already
    /// registered suffix whose codec is reused. The last registration of a
    /// suffix wins. When `native_type` is given the codec also becomes that
    /// type's default, except that an existing [`NativeType::Mapping`]
    /// default is kept; use [`reclaim_default`](Self::reclaim_default) to
    /// replace it deliberately.
    ///
    /// On error nothing is changed.
    pub fn register(
        &mut self,
        suffix: impl Into<String>,
        codec: impl Into<CodecSpec>,
        native_type: Option<NativeType>,
    ) -> Result<(), RegistryError> {
        let suffix = suffix.into();
        let codec = match codec.into() {
            CodecSpec::Alias(target) => {
                if let Some(native_type) = native_type {
                    return Err(RegistryError::ConflictingAliasBinding {
                        suffix,
                        target,
                        native_type,
                    });
                }
                match self.suffixes.get(&target) {
                    Some(codec) => {
                        debug!(%suffix, %target, "registering alias");
                        codec.clone()
                    }
                    None => return Err(RegistryError::UnknownAliasTarget { suffix, target }),
                }
            }
            CodecSpec::Codec(codec) => codec,
        };

        check_contract(&suffix, &codec)?;

        debug!(%suffix, codec = codec.name(), ?native_type, "registering codec");
        self.suffixes.insert(suffix, codec.clone());
        if let Some(native_type) = native_type {
            self.claim_default(native_type, &codec);
        }
        self.remember(codec);
        Ok(())
    }

    /// Make `codec` the default for `native_type`, overriding the protection
    /// of the [`NativeType::Mapping`] default.
    ///
    /// The codec is checked like in [`register`](Self::register) and becomes
    /// a known codec if it was not one already. On error nothing is changed.
    pub fn reclaim_default(
        &mut self,
        native_type: NativeType,
        codec: &CodecRef,
    ) -> Result<(), RegistryError> {
        check_contract(native_type.name(), codec)?;
        debug!(%native_type, codec = codec.name(), "reclaiming default codec");
        self.types.insert(native_type, codec.clone());
        self.remember(codec.clone());
        Ok(())
    }

    fn claim_default(&mut self, native_type: NativeType, codec: &CodecRef) {
        if native_type == NativeType::Mapping {
            if let Some(current) = self.types.get(&native_type) {
                if !Arc::ptr_eq(current, codec) {
                    warn!(
                        current = current.name(),
                        ignored = codec.name(),
                        "keeping protected default codec for mapping values"
                    );
                }
                return;
            }
        }
        self.types.insert(native_type, codec.clone());
    }

    fn remember(&mut self, codec: CodecRef) {
        if !self.is_known(&codec) {
            self.known.push(codec);
        }
    }

    fn is_known(&self, codec: &CodecRef) -> bool {
        self.known.iter().any(|c| Arc::ptr_eq(c, codec))
    }

    /// Codec registered for exactly this suffix.
    pub fn codec_for_suffix(&self, suffix: &str) -> Option<&CodecRef> {
        self.suffixes.get(suffix)
    }

    pub fn contains_suffix(&self, suffix: &str) -> bool {
        self.suffixes.contains_key(suffix)
    }

    /// Default codec for a native type.
    pub fn default_for(&self, native_type: NativeType) -> Option<&CodecRef> {
        self.types.get(&native_type)
    }

    /// Default codec for a value's native type.
    pub fn codec_for_value(&self, value: &ItemValue) -> Option<&CodecRef> {
        self.default_for(value.native_type())
    }

    /// Codec for a known suffix, else the value's default codec.
    pub fn resolve(&self, suffix: Option<&str>, value: &ItemValue) -> Option<&CodecRef> {
        suffix
            .and_then(|s| self.codec_for_suffix(s))
            .or_else(|| self.codec_for_value(value))
    }

    /// Distinct codecs in first-registration order.
    pub fn known_codecs(&self) -> &[CodecRef] {
        &self.known
    }

    /// Registered suffixes with their codecs, sorted by suffix.
    pub fn suffixes(&self) -> impl Iterator<Item = (&str, &CodecRef)> {
        self.suffixes.iter().map(|(s, c)| (s.as_str(), c))
    }

    /// Native types with a default codec.
    pub fn defaults(&self) -> impl Iterator<Item = (NativeType, &CodecRef)> {
        self.types.iter().map(|(t, c)| (*t, c))
    }

    /// Enable the encode-time hash self-check on items created by this registry.
    pub fn with_hash_check(mut self, verify: bool) -> Self {
        self.verify_hash = verify;
        self
    }

    /// Item for storing `value` under `name`.
    ///
    /// Uses the codec of the name's suffix, or the value's default codec when
    /// the name has no registered suffix.
    pub fn item_from_value(&self, name: &str, value: ItemValue) -> Result<Item, CodecError> {
        let codec = self
            .resolve(suffix_of(name), &value)
            .ok_or_else(|| CodecError::NoDefaultCodec(value.native_type()))?;
        Ok(Item::new(codec.clone(), value)?.with_hash_check(self.verify_hash))
    }

    /// Item decoded from bytes stored under `name`.
    pub fn item_from_bytes(&self, name: &str, data: &[u8]) -> Result<Item, CodecError> {
        let suffix = suffix_of(name).ok_or_else(|| CodecError::MissingSuffix(name.to_owned()))?;
        let codec = self
            .codec_for_suffix(suffix)
            .ok_or_else(|| CodecError::UnknownSuffix(suffix.to_owned()))?;
        Ok(Item::decode(codec.clone(), data)?.with_hash_check(self.verify_hash))
    }
}

fn check_contract(suffix: &str, codec: &CodecRef) -> Result<(), RegistryError> {
    match codec.capabilities().first_missing() {
        Some(capability) => Err(RegistryError::ContractViolation {
            suffix: suffix.to_owned(),
            codec: codec.name(),
            capability,
        }),
        None => Ok(()),
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |c: &CodecRef| c.name();
        f.debug_struct("CodecRegistry")
            .field(
                "suffixes",
                &self
                    .suffixes
                    .iter()
                    .map(|(s, c)| (s, names(c)))
                    .collect::<BTreeMap<_, _>>(),
            )
            .field(
                "types",
                &self
                    .types
                    .iter()
                    .map(|(t, c)| (t, names(c)))
                    .collect::<BTreeMap<_, _>>(),
            )
            .field("known", &self.known.iter().map(names).collect::<Vec<_>>())
            .finish()
    }
}
