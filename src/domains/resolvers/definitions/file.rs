//! File resolver definition.
//!
//! Reads a file relative to the definition document and returns its
//! contents as a string.

use async_trait::async_trait;
use base64::Engine;
use std::path::PathBuf;
use tracing::debug;

use super::{Artifact, Resolver};
use crate::core::security::{ensure_within_root, resolve_against};
use crate::domains::definition::Definition;
use crate::domains::resolvers::error::{ResolverError, ResolverResult};
use crate::domains::resolvers::registry::ResolverOptions;
use crate::domains::resolvers::visitor::Visitor;

/// How file contents are turned into a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEncoding {
    /// Contents must be valid UTF-8 and are returned as text.
    Utf8,

    /// Contents are returned base64-encoded.
    Base64,
}

impl FileEncoding {
    /// Parse an `encoding` property value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }
}

/// File resolver - loads file contents through the async filesystem.
pub struct FileResolver {
    root_path: Option<PathBuf>,
}

impl FileResolver {
    /// Resolver type name.
    pub const RESOLVER_TYPE: &'static str = "file";

    /// Property that routes a definition here.
    pub const TELLTALE: &'static str = "file";

    /// Optional property selecting the encoding.
    pub const ENCODING: &'static str = "encoding";

    /// Encoding used when `encoding` is absent.
    pub const DEFAULT_ENCODING: FileEncoding = FileEncoding::Utf8;

    pub fn new(options: &ResolverOptions) -> Self {
        Self {
            root_path: options.root_path.clone(),
        }
    }

    async fn encoding(
        &self,
        visitor: &Visitor<'_>,
        definition: &Definition,
    ) -> ResolverResult<FileEncoding> {
        let Some(artifact) = visitor.upward_optional(definition, Self::ENCODING).await? else {
            return Ok(Self::DEFAULT_ENCODING);
        };

        let raw = artifact.as_str().ok_or_else(|| {
            ResolverError::invalid_type(Self::RESOLVER_TYPE, Self::ENCODING, "string", artifact.kind())
        })?;

        FileEncoding::parse(raw).ok_or_else(|| ResolverError::UnsupportedEncoding {
            resolver: Self::RESOLVER_TYPE,
            encoding: raw.to_string(),
        })
    }
}

#[async_trait]
impl Resolver for FileResolver {
    fn resolver_type(&self) -> &'static str {
        Self::RESOLVER_TYPE
    }

    fn telltale(&self) -> &'static str {
        Self::TELLTALE
    }

    async fn resolve(
        &self,
        visitor: &Visitor<'_>,
        definition: &Definition,
    ) -> ResolverResult<Artifact> {
        if !definition.contains(Self::TELLTALE) {
            return Err(ResolverError::missing_property(Self::TELLTALE, definition));
        }

        let resolved = visitor.upward(definition, Self::TELLTALE).await?;
        let file = resolved.as_str().ok_or_else(|| {
            ResolverError::invalid_type(Self::RESOLVER_TYPE, Self::TELLTALE, "string", resolved.kind())
        })?;
        let encoding = self.encoding(visitor, definition).await?;

        let path = resolve_against(visitor.upward_path(), file);
        let path = ensure_within_root(&path, self.root_path.as_deref())?;
        debug!(path = %path.display(), ?encoding, "Reading file");

        let contents = match encoding {
            FileEncoding::Utf8 => tokio::fs::read_to_string(&path).await?,
            FileEncoding::Base64 => {
                base64::engine::general_purpose::STANDARD.encode(tokio::fs::read(&path).await?)
            }
        };

        Ok(Artifact::string(contents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::definition::Document;
    use crate::domains::resolvers::{Environment, ResolverRegistry};
    use std::fs;
    use tempfile::TempDir;

    async fn resolve_in(dir: &TempDir, yaml: &str) -> ResolverResult<Artifact> {
        let registry = ResolverRegistry::with_defaults(&ResolverOptions::default()).unwrap();
        let doc = Document::parse(yaml, dir.path().join("upward.yml")).unwrap();
        let env = Environment::default();
        let visitor = Visitor::new(&registry, &doc, &env);
        visitor.upward_root("value").await
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("templates")).unwrap();
        fs::write(dir.path().join("templates").join("hello.txt"), "hello").unwrap();
        dir
    }

    #[test]
    fn test_encoding_parse() {
        assert_eq!(FileEncoding::parse("utf-8"), Some(FileEncoding::Utf8));
        assert_eq!(FileEncoding::parse("UTF8"), Some(FileEncoding::Utf8));
        assert_eq!(FileEncoding::parse("base64"), Some(FileEncoding::Base64));
        assert_eq!(FileEncoding::parse("latin1"), None);
    }

    #[tokio::test]
    async fn test_reads_relative_to_document() {
        let dir = fixture();
        let artifact = resolve_in(&dir, "value:\n  file: templates/hello.txt\n")
            .await
            .unwrap();
        assert_eq!(artifact.as_str(), Some("hello"));
    }

    #[tokio::test]
    async fn test_base64_encoding() {
        let dir = fixture();
        let artifact = resolve_in(
            &dir,
            "value:\n  file: templates/hello.txt\n  encoding: base64\n",
        )
        .await
        .unwrap();
        assert_eq!(artifact.as_str(), Some("aGVsbG8="));
    }

    #[tokio::test]
    async fn test_file_name_resolved_through_reference() {
        let dir = fixture();
        let artifact = resolve_in(
            &dir,
            "name: templates/hello.txt\nvalue:\n  file: $name\n",
        )
        .await
        .unwrap();
        assert_eq!(artifact.as_str(), Some("hello"));
    }

    #[tokio::test]
    async fn test_unsupported_encoding() {
        let dir = fixture();
        let result = resolve_in(
            &dir,
            "value:\n  file: templates/hello.txt\n  encoding: latin1\n",
        )
        .await;
        assert!(matches!(
            result,
            Err(ResolverError::UnsupportedEncoding { ref encoding, .. }) if encoding == "latin1"
        ));
    }

    #[tokio::test]
    async fn test_missing_file_propagates_io_error() {
        let dir = fixture();
        let result = resolve_in(&dir, "value:\n  file: nope.txt\n").await;
        match result {
            Err(ResolverError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_string_file_rejected() {
        let dir = fixture();
        let result = resolve_in(&dir, "value:\n  file: [a, b]\n").await;
        assert!(matches!(
            result,
            Err(ResolverError::InvalidType {
                resolver: "file",
                found: "array",
                ..
            })
        ));
    }
}
