//! Resolver definitions module.
//!
//! Each resolver type is defined in its own file with:
//! - `RESOLVER_TYPE` and `TELLTALE` constants
//! - A [`Resolver`] implementation
//!
//! ## Adding a New Resolver
//!
//! 1. Create a new file (e.g., `my_resolver.rs`)
//! 2. Implement the `Resolver` trait
//! 3. Export it here
//! 4. Register in `registry.rs`

use async_trait::async_trait;

use super::error::ResolverResult;
use super::handlers::SharedHandler;
use super::visitor::Visitor;
use crate::domains::definition::{Definition, json_kind};

mod directory;
mod file;
mod inline;

pub use directory::DirectoryResolver;
pub use file::{FileEncoding, FileResolver};
pub use inline::InlineResolver;

/// The product of resolving a definition.
#[derive(Debug, Clone)]
pub enum Artifact {
    /// A scalar or structured value, consumed by a parent resolution.
    Value(serde_json::Value),

    /// A request handler, the terminal artifact of routing resolvers.
    Handler(SharedHandler),
}

impl Artifact {
    /// Shorthand for a string value.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(serde_json::Value::String(value.into()))
    }

    /// The string inside a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The handler inside a handler artifact.
    pub fn as_handler(&self) -> Option<&SharedHandler> {
        match self {
            Self::Handler(handler) => Some(handler),
            Self::Value(_) => None,
        }
    }

    pub fn into_handler(self) -> Option<SharedHandler> {
        match self {
            Self::Handler(handler) => Some(handler),
            Self::Value(_) => None,
        }
    }

    /// Short description of the artifact's shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value(value) => json_kind(value),
            Self::Handler(_) => "handler",
        }
    }
}

/// Trait for resolver types.
///
/// A resolver is stateless with respect to a single resolution: everything
/// it needs from the surrounding tree comes through the `visitor` it is
/// handed. State that outlives a call, such as a cache of constructed
/// handlers, belongs to the resolver value itself and is private to it.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Unique name of the resolver type, for diagnostics.
    fn resolver_type(&self) -> &'static str;

    /// Property whose presence routes a definition to this resolver.
    fn telltale(&self) -> &'static str;

    /// Resolve `definition`, which the visitor guarantees carries this
    /// resolver's telltale.
    async fn resolve(&self, visitor: &Visitor<'_>, definition: &Definition)
    -> ResolverResult<Artifact>;
}
