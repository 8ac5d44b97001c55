// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry mapping a [`ProviderKind`] to a constructor.
//!
//! The registry is a plain value owned by whoever builds sessions, so tests
//! can swap a backend for a double by registering the same kind again.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::TandemError;
use crate::traits::ProviderAdapter;
use crate::types::{ProviderConfig, ProviderKind};

/// Factory for creating provider instances from configuration.
pub trait ProviderFactory: Send + Sync {
    /// Build a provider for `config`. Construction must not perform network I/O.
    fn create(&self, config: ProviderConfig) -> Result<Arc<dyn ProviderAdapter>, TandemError>;
}

impl<F> ProviderFactory for F
where
    F: Fn(ProviderConfig) -> Result<Arc<dyn ProviderAdapter>, TandemError> + Send + Sync,
{
    fn create(&self, config: ProviderConfig) -> Result<Arc<dyn ProviderAdapter>, TandemError> {
        self(config)
    }
}

/// Registry of provider constructors keyed by [`ProviderKind`].
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    factories: BTreeMap<ProviderKind, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: ProviderKind, factory: F)
    where
        F: ProviderFactory + 'static,
    {
        if self.factories.insert(kind, Arc::new(factory)).is_some() {
            info!(provider = %kind, "replaced provider registration");
        } else {
            debug!(provider = %kind, "registered provider");
        }
    }

    /// Returns true if a constructor is registered for `kind`.
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Registered kinds in stable order.
    pub fn registered(&self) -> Vec<ProviderKind> {
        self.factories.keys().copied().collect()
    }

    /// Validate `config` and build the provider registered for its kind.
    pub fn create(&self, config: ProviderConfig) -> Result<Arc<dyn ProviderAdapter>, TandemError> {
        let factory = self.factories.get(&config.provider).ok_or_else(|| {
            TandemError::UnsupportedProvider {
                requested: config.provider.to_string(),
                registered: self.registered().iter().map(ToString::to_string).collect(),
            }
        })?;
        config.validate()?;
        info!(provider = %config.provider, model = %config.model_name, "creating provider");
        factory.create(config)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}
