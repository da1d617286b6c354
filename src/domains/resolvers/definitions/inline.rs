//! Inline resolver definition.

use async_trait::async_trait;

use super::{Artifact, Resolver};
use crate::domains::definition::Definition;
use crate::domains::resolvers::error::{ResolverError, ResolverResult};
use crate::domains::resolvers::visitor::Visitor;

/// Inline resolver - returns its `inline` value verbatim.
///
/// Nested mappings come back as JSON objects and `$` references are not
/// followed, which makes `inline` the way to write a literal that would
/// otherwise be interpreted. Escaped `$$` strings lose their escape, as
/// they do anywhere else in a document.
pub struct InlineResolver;

impl InlineResolver {
    /// Resolver type name.
    pub const RESOLVER_TYPE: &'static str = "inline";

    /// Property that routes a definition here.
    pub const TELLTALE: &'static str = "inline";
}

#[async_trait]
impl Resolver for InlineResolver {
    fn resolver_type(&self) -> &'static str {
        Self::RESOLVER_TYPE
    }

    fn telltale(&self) -> &'static str {
        Self::TELLTALE
    }

    async fn resolve(
        &self,
        _visitor: &Visitor<'_>,
        definition: &Definition,
    ) -> ResolverResult<Artifact> {
        let value = definition
            .get(Self::TELLTALE)
            .ok_or_else(|| ResolverError::missing_property(Self::TELLTALE, definition))?;

        Ok(Artifact::Value(value.to_literal_json()))
    }
}
