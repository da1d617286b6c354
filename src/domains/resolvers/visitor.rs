//! Resolution visitor.
//!
//! The visitor drives recursive resolution. Resolvers call back into it to
//! turn properties into concrete values: literals come back unchanged,
//! nested definitions are routed to their resolver by telltale, and
//! references are followed with cycle detection.
//!
//! There is no memoization here. Resolvers that construct expensive
//! artifacts cache them in their own [`ResourceCache`](super::ResourceCache).

use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use tracing::debug;

use super::definitions::Artifact;
use super::error::{ResolverError, ResolverResult};
use super::registry::ResolverRegistry;
use crate::domains::definition::{Definition, Document, Reference, Value};

/// Snapshot of environment variables visible to `$env.NAME` references.
///
/// Taken once so that resolution stays deterministic for the lifetime of
/// the service.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        Self {
            vars: vars
                .into_iter()
                .filter_map(|(name, value)| {
                    Some((name.into_string().ok()?, value.into_string().ok()?))
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Recursive resolution driver for one document.
///
/// Cheap to clone. The `chain` holds the root-level properties currently
/// being followed through references; re-entering one is a cycle.
#[derive(Clone)]
pub struct Visitor<'a> {
    registry: &'a ResolverRegistry,
    document: &'a Document,
    environment: &'a Environment,
    chain: Vec<String>,
}

impl<'a> Visitor<'a> {
    pub fn new(
        registry: &'a ResolverRegistry,
        document: &'a Document,
        environment: &'a Environment,
    ) -> Self {
        Self {
            registry,
            document,
            environment,
            chain: Vec::new(),
        }
    }

    /// Absolute path of the document under resolution.
    pub fn upward_path(&self) -> &Path {
        self.document.path()
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    /// Resolve the required property `property` of `definition`.
    pub fn upward<'v>(
        &'v self,
        definition: &'v Definition,
        property: &'v str,
    ) -> BoxFuture<'v, ResolverResult<Artifact>> {
        async move {
            let value = definition
                .get(property)
                .ok_or_else(|| ResolverError::missing_property(property, definition))?;
            self.resolve_value(value).await
        }
        .boxed()
    }

    /// Resolve `property` of `definition` if present.
    ///
    /// `None` lets the caller apply its documented default.
    pub fn upward_optional<'v>(
        &'v self,
        definition: &'v Definition,
        property: &'v str,
    ) -> BoxFuture<'v, ResolverResult<Option<Artifact>>> {
        async move {
            match definition.get(property) {
                Some(value) => self.resolve_value(value).await.map(Some),
                None => Ok(None),
            }
        }
        .boxed()
    }

    /// Resolve a root-level property of the document.
    ///
    /// The property becomes the first link of the reference chain, so a
    /// reference that loops back to it is reported as a cycle.
    pub fn upward_root<'v>(&'v self, property: &'v str) -> BoxFuture<'v, ResolverResult<Artifact>> {
        async move {
            let root = self.document.root();
            if !root.contains(property) {
                return Err(ResolverError::missing_property(property, root));
            }
            self.follow(property).await
        }
        .boxed()
    }

    /// Route `definition` to its resolver and resolve it.
    pub fn resolve<'v>(&'v self, definition: &'v Definition) -> BoxFuture<'v, ResolverResult<Artifact>> {
        async move {
            let resolver = self.registry.lookup(definition)?;
            debug!(
                resolver = resolver.resolver_type(),
                definition = %definition,
                "Resolving definition"
            );
            resolver.resolve(self, definition).await
        }
        .boxed()
    }

    fn resolve_value<'v>(&'v self, value: &'v Value) -> BoxFuture<'v, ResolverResult<Artifact>> {
        async move {
            match value {
                Value::Literal(literal) => Ok(Artifact::Value(literal.clone())),
                Value::Definition(definition) => self.resolve(definition).await,
                Value::Reference(Reference::Property(name)) => {
                    if !self.document.root().contains(name) {
                        return Err(ResolverError::unresolved(Reference::Property(name.clone())));
                    }
                    self.follow(name).await
                }
                Value::Reference(reference @ Reference::Env(var)) => self
                    .environment
                    .get(var)
                    .map(Artifact::string)
                    .ok_or_else(|| ResolverError::unresolved(reference)),
            }
        }
        .boxed()
    }

    /// Resolve root property `name` with `name` pushed onto the chain.
    fn follow<'v>(&'v self, name: &'v str) -> BoxFuture<'v, ResolverResult<Artifact>> {
        async move {
            if self.chain.iter().any(|link| link == name) {
                let chain = self
                    .chain
                    .iter()
                    .map(String::as_str)
                    .chain([name])
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(ResolverError::CircularDefinition { chain });
            }

            debug!(reference = name, depth = self.chain.len(), "Following reference");
            let mut inner = self.clone();
            inner.chain.push(name.to_string());
            inner.upward(self.document.root(), name).await
        }
        .boxed()
    }
}

impl fmt::Debug for Visitor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visitor")
            .field("upward_path", &self.document.path())
            .field("chain", &self.chain)
            .finish()
    }
}
