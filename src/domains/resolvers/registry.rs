//! Resolver Registry - central registration of all resolver types.
//!
//! This module maps telltale property names to resolver implementations.
//! When adding a new resolver:
//! 1. Create the resolver file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `with_defaults()`

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::definitions::{DirectoryResolver, FileResolver, InlineResolver, Resolver};
use super::error::{ResolverError, ResolverResult};
use crate::core::config::{Config, RuntimeMode};
use crate::domains::definition::Definition;

/// Settings shared by the built-in resolvers.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Runtime mode, baked into handlers when they are constructed.
    pub mode: RuntimeMode,

    /// Optional directory that resolved paths must stay within.
    pub root_path: Option<PathBuf>,
}

impl ResolverOptions {
    /// Derive resolver settings from the server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.runtime.mode,
            root_path: config.security.root_path.clone(),
        }
    }
}

/// Table of resolver types keyed by telltale.
///
/// Lookup scans the registered telltales, so its cost grows with the number
/// of resolver types and not with the size of the definition tree.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in resolver.
    ///
    /// This is the central place where resolvers are registered.
    pub fn with_defaults(options: &ResolverOptions) -> ResolverResult<Self> {
        let mut registry = Self::new();
        registry.register(DirectoryResolver::new(options))?;
        registry.register(FileResolver::new(options))?;
        registry.register(InlineResolver)?;
        Ok(registry)
    }

    /// Register a resolver.
    ///
    /// Fails if another resolver already claims the same telltale.
    pub fn register<R: Resolver + 'static>(&mut self, resolver: R) -> ResolverResult<()> {
        self.register_shared(Arc::new(resolver))
    }

    /// Register an already shared resolver.
    pub fn register_shared(&mut self, resolver: Arc<dyn Resolver>) -> ResolverResult<()> {
        if let Some(existing) = self.find(resolver.telltale()) {
            return Err(ResolverError::DuplicateTelltale {
                telltale: resolver.telltale(),
                existing: existing.resolver_type(),
                incoming: resolver.resolver_type(),
            });
        }

        info!(
            "Registering resolver: {} (telltale '{}')",
            resolver.resolver_type(),
            resolver.telltale()
        );
        self.resolvers.push(resolver);
        Ok(())
    }

    /// The resolver claiming `telltale`, if any.
    pub fn find(&self, telltale: &str) -> Option<&dyn Resolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.telltale() == telltale)
            .map(|resolver| resolver.as_ref())
    }

    /// The unique resolver whose telltale appears on `definition`.
    pub fn lookup(&self, definition: &Definition) -> ResolverResult<&dyn Resolver> {
        let matches: Vec<&dyn Resolver> = self
            .resolvers
            .iter()
            .filter(|resolver| definition.contains(resolver.telltale()))
            .map(|resolver| resolver.as_ref())
            .collect();

        match matches.as_slice() {
            [resolver] => Ok(*resolver),
            [] => Err(ResolverError::NoMatchingResolver {
                definition: definition.to_string(),
                known: self.telltales().join(", "),
            }),
            many => Err(ResolverError::AmbiguousDefinition {
                definition: definition.to_string(),
                telltales: many
                    .iter()
                    .map(|resolver| resolver.telltale())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Registered telltales, in registration order.
    pub fn telltales(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.telltale()).collect()
    }

    /// Registered resolver types, in registration order.
    pub fn resolver_types(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.resolver_type()).collect()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("telltales", &self.telltales())
            .finish()
    }
}
