//! Resolution service implementation.
//!
//! The ResolutionService owns everything a resolution needs for the lifetime
//! of the server: the parsed document, the resolver registry (and through it
//! each resolver's cache), and the environment snapshot.

use tracing::{info, instrument};

use super::definitions::Artifact;
use super::error::{ResolverError, ResolverResult};
use super::handlers::SharedHandler;
use super::registry::ResolverRegistry;
use super::visitor::{Environment, Visitor};
use crate::domains::definition::Document;

/// Service for resolving properties of a definition document.
#[derive(Debug)]
pub struct ResolutionService {
    document: Document,
    registry: ResolverRegistry,
    environment: Environment,
}

impl ResolutionService {
    /// Create a new ResolutionService.
    pub fn new(document: Document, registry: ResolverRegistry, environment: Environment) -> Self {
        info!(
            "Initializing ResolutionService for {} ({} resolver types)",
            document.path().display(),
            registry.len()
        );

        Self {
            document,
            registry,
            environment,
        }
    }

    /// A fresh visitor over this service's document.
    pub fn visitor(&self) -> Visitor<'_> {
        Visitor::new(&self.registry, &self.document, &self.environment)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    /// Resolve a root-level property of the document.
    #[instrument(skip(self))]
    pub async fn resolve_property(&self, property: &str) -> ResolverResult<Artifact> {
        let visitor = self.visitor();
        visitor.upward_root(property).await
    }

    /// Resolve a root-level property that must produce a request handler.
    pub async fn resolve_handler(&self, property: &str) -> ResolverResult<SharedHandler> {
        match self.resolve_property(property).await? {
            Artifact::Handler(handler) => Ok(handler),
            other => Err(ResolverError::NotAHandler {
                property: property.to_string(),
                found: other.kind(),
            }),
        }
    }
}
