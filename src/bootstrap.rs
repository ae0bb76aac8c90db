//! Registry construction from codec providers.

use std::sync::OnceLock;

use tracing::debug;

use crate::provider::builtin_providers;
use crate::{CodecConfig, CodecProvider, CodecRegistry, RegistryError};

/// Builds a [`CodecRegistry`] from providers in a fixed order.
///
/// Providers whose [`probe`](CodecProvider::probe) fails are skipped. Their
/// registrations are absent and the rest of the registry is unaffected. A
/// registration error from an available provider aborts the build.
///
/// # Example
///
/// ```
/// use itemcodecs::{Bootstrap, NativeType};
///
/// let registry = Bootstrap::new().build()?;
/// assert_eq!(registry.default_for(NativeType::Mapping).unwrap().name(), "json");
/// # Ok::<(), itemcodecs::RegistryError>(())
/// ```
pub struct Bootstrap {
    config: CodecConfig,
    providers: Vec<Box<dyn CodecProvider>>,
}

impl Bootstrap {
    /// Builtin providers with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Builtin providers with a custom configuration.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            providers: builtin_providers(),
        }
    }

    /// Replace the provider list.
    pub fn with_providers(mut self, providers: Vec<Box<dyn CodecProvider>>) -> Self {
        self.providers = providers;
        self
    }

    /// Append a provider after the current ones.
    pub fn with_provider(mut self, provider: impl CodecProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn build(self) -> Result<CodecRegistry, RegistryError> {
        let mut registry = CodecRegistry::new().with_hash_check(self.config.verify_hash);
        for provider in &self.providers {
            if let Err(missing) = provider.probe() {
                debug!(provider = provider.name(), %missing, "skipping codec provider");
                continue;
            }
            for reg in provider.registrations(&self.config) {
                registry.register(reg.suffix, reg.codec, reg.native_type)?;
            }
            debug!(provider = provider.name(), "codec provider loaded");
        }
        Ok(registry)
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceLock<Result<CodecRegistry, RegistryError>> = OnceLock::new();

/// Process-wide registry of the builtin providers, built on first use.
pub fn try_global() -> Result<&'static CodecRegistry, RegistryError> {
    GLOBAL
        .get_or_init(|| Bootstrap::new().build())
        .as_ref()
        .map_err(Clone::clone)
}

/// Process-wide registry of the builtin providers.
///
/// # Panics
///
/// If a builtin codec fails registration, which is a bug in this crate.
pub fn global() -> &'static CodecRegistry {
    match try_global() {
        Ok(registry) => registry,
        Err(e) => panic!("builtin codec registration failed: {e}"),
    }
}
