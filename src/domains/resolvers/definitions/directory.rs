//! Directory resolver definition.
//!
//! Turns a `directory` definition into a static-file handler. One handler is
//! constructed per base directory and shared by every later resolution.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{Artifact, Resolver};
use crate::core::config::RuntimeMode;
use crate::core::security::{ensure_within_root, resolve_against};
use crate::domains::definition::Definition;
use crate::domains::resolvers::cache::ResourceCache;
use crate::domains::resolvers::error::{ResolverError, ResolverResult};
use crate::domains::resolvers::handlers::{SharedHandler, StaticDirectoryHandler};
use crate::domains::resolvers::registry::ResolverOptions;
use crate::domains::resolvers::visitor::Visitor;

/// Directory resolver - serves static files from a directory.
pub struct DirectoryResolver {
    mode: RuntimeMode,
    root_path: Option<PathBuf>,
    servers: Arc<ResourceCache<SharedHandler>>,
}

impl DirectoryResolver {
    /// Resolver type name.
    pub const RESOLVER_TYPE: &'static str = "directory";

    /// Property that routes a definition here.
    pub const TELLTALE: &'static str = "directory";

    pub fn new(options: &ResolverOptions) -> Self {
        Self {
            mode: options.mode,
            root_path: options.root_path.clone(),
            servers: Arc::new(ResourceCache::new(Self::RESOLVER_TYPE)),
        }
    }

    /// Handlers constructed so far, keyed by absolute base directory.
    pub fn servers(&self) -> &ResourceCache<SharedHandler> {
        &self.servers
    }

    /// Cache lifetime given to clients for served files.
    pub fn max_age(&self) -> Duration {
        if self.mode.is_production() {
            StaticDirectoryHandler::PRODUCTION_MAX_AGE
        } else {
            Duration::ZERO
        }
    }
}

#[async_trait]
impl Resolver for DirectoryResolver {
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
        let directory = resolved.as_str().ok_or_else(|| {
            ResolverError::invalid_type(
                Self::RESOLVER_TYPE,
                Self::TELLTALE,
                "string",
                resolved.kind(),
            )
        })?;
        if directory.trim().is_empty() {
            return Err(ResolverError::missing_property(Self::TELLTALE, definition));
        }
        debug!(directory, "Resolved directory");

        let base_dir = resolve_against(visitor.upward_path(), directory);
        let base_dir = ensure_within_root(&base_dir, self.root_path.as_deref())?;
        let key = base_dir.to_string_lossy().into_owned();

        let max_age = self.max_age();
        let handler = self
            .servers
            .get_or_try_init(&key, || async {
                info!(
                    directory,
                    base_dir = %base_dir.display(),
                    document = %visitor.upward_path().display(),
                    max_age = max_age.as_secs(),
                    "Creating static server"
                );
                let handler: SharedHandler =
                    Arc::new(StaticDirectoryHandler::new(base_dir.clone(), max_age));
                Ok::<_, ResolverError>(handler)
            })
            .await?;

        Ok(Artifact::Handler(handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::security::PathSecurityError;
    use crate::domains::definition::{Document, Value};
    use crate::domains::resolvers::{Environment, ResolverRegistry};
    use serde_json::json;

    fn options() -> ResolverOptions {
        ResolverOptions::default()
    }

    fn document(path: &str, yaml: &str) -> Document {
        Document::parse(yaml, path).unwrap()
    }

    fn handler_of(artifact: Artifact) -> SharedHandler {
        artifact.into_handler().expect("expected a handler")
    }

    #[tokio::test]
    async fn test_same_directory_shares_handler() {
        let resolver = DirectoryResolver::new(&options());
        let registry = ResolverRegistry::new();
        let env = Environment::default();
        let doc = document("/srv/app/upward.yml", "handler:\n  directory: static\n");
        let visitor = Visitor::new(&registry, &doc, &env);
        let definition = Definition::new(doc.path()).with("directory", Value::string("static"));

        let first = handler_of(resolver.resolve(&visitor, &definition).await.unwrap());
        let second = handler_of(resolver.resolve(&visitor, &definition).await.unwrap());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.servers().len(), 1);
        assert!(resolver.servers().contains("/srv/app/static"));
    }

    #[tokio::test]
    async fn test_different_documents_do_not_share() {
        let resolver = DirectoryResolver::new(&options());
        let registry = ResolverRegistry::new();
        let env = Environment::default();
        let definition = Definition::new("/x").with("directory", Value::string("assets"));

        let doc_a = document("/srv/a/upward.yml", "a: 1\n");
        let doc_b = document("/srv/b/upward.yml", "a: 1\n");
        let a = handler_of(
            resolver
                .resolve(&Visitor::new(&registry, &doc_a, &env), &definition)
                .await
                .unwrap(),
        );
        let b = handler_of(
            resolver
                .resolve(&Visitor::new(&registry, &doc_b, &env), &definition)
                .await
                .unwrap(),
        );

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(resolver.servers().len(), 2);
    }

    #[tokio::test]
    async fn test_equivalent_spellings_share() {
        let resolver = DirectoryResolver::new(&options());
        let registry = ResolverRegistry::new();
        let env = Environment::default();
        let doc = document("/srv/app/upward.yml", "a: 1\n");
        let visitor = Visitor::new(&registry, &doc, &env);

        let plain = Definition::new(doc.path()).with("directory", Value::string("static"));
        let dotted = Definition::new(doc.path()).with("directory", Value::string("./lib/../static/"));

        let a = handler_of(resolver.resolve(&visitor, &plain).await.unwrap());
        let b = handler_of(resolver.resolve(&visitor, &dotted).await.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_missing_directory_leaves_cache_untouched() {
        let resolver = DirectoryResolver::new(&options());
        let registry = ResolverRegistry::new();
        let env = Environment::default();
        let doc = document("/srv/app/upward.yml", "a: 1\n");
        let visitor = Visitor::new(&registry, &doc, &env);

        let definition = Definition::new(doc.path()).with("root", Value::string("static"));
        let result = resolver.resolve(&visitor, &definition).await;

        match result {
            Err(ResolverError::MissingProperty { property, .. }) => assert_eq!(property, "directory"),
            other => panic!("expected MissingProperty, got {:?}", other),
        }
        assert!(resolver.servers().is_empty());
    }

    #[tokio::test]
    async fn test_empty_directory_is_missing() {
        let resolver = DirectoryResolver::new(&options());
        let registry = ResolverRegistry::new();
        let env = Environment::default();
        let doc = document("/srv/app/upward.yml", "a: 1\n");
        let visitor = Visitor::new(&registry, &doc, &env);

        for blank in ["", "   "] {
            let definition = Definition::new(doc.path()).with("directory", Value::string(blank));
            let result = resolver.resolve(&visitor, &definition).await;
            assert!(matches!(
                result,
                Err(ResolverError::MissingProperty { ref property, .. }) if property == "directory"
            ));
        }
        assert!(resolver.servers().is_empty());
    }

    #[tokio::test]
    async fn test_non_string_directory_rejected() {
        let resolver = DirectoryResolver::new(&options());
        let registry = ResolverRegistry::new();
        let env = Environment::default();
        let doc = document("/srv/app/upward.yml", "a: 1\n");
        let visitor = Visitor::new(&registry, &doc, &env);

        let definition =
            Definition::new(doc.path()).with("directory", Value::Literal(json!(42)));
        let result = resolver.resolve(&visitor, &definition).await;

        assert!(matches!(
            result,
            Err(ResolverError::InvalidType {
                resolver: "directory",
                expected: "string",
                found: "number",
                ..
            })
        ));
        assert!(resolver.servers().is_empty());
    }

    #[tokio::test]
    async fn test_directory_resolved_through_visitor() {
        let registry = ResolverRegistry::with_defaults(&options()).unwrap();
        let env = Environment::default();
        let doc = document(
            "/srv/app/upward.yml",
            "handler:\n  directory:\n    inline: dist\n",
        );
        let visitor = Visitor::new(&registry, &doc, &env);

        let artifact = visitor.upward_root("handler").await.unwrap();
        assert_eq!(artifact.kind(), "handler");

        let resolver = registry.find(DirectoryResolver::TELLTALE).unwrap();
        assert_eq!(resolver.resolver_type(), "directory");
    }

    #[tokio::test]
    async fn test_directory_outside_root_rejected() {
        let resolver = DirectoryResolver::new(&ResolverOptions {
            root_path: Some(PathBuf::from("/srv/app")),
            ..Default::default()
        });
        let registry = ResolverRegistry::new();
        let env = Environment::default();
        let doc = document("/srv/app/upward.yml", "a: 1\n");
        let visitor = Visitor::new(&registry, &doc, &env);

        let definition = Definition::new(doc.path()).with("directory", Value::string("../../etc"));
        let result = resolver.resolve(&visitor, &definition).await;

        assert!(matches!(result, Err(ResolverError::Security(_))));
        assert!(resolver.servers().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_directory_outside_root_rejected() {
        let root_dir = tempfile::TempDir::new().unwrap();
        let outside_dir = tempfile::TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside_dir.path(), root_dir.path().join("link")).unwrap();

        let resolver = DirectoryResolver::new(&ResolverOptions {
            root_path: Some(root_dir.path().to_path_buf()),
            ..Default::default()
        });
        let registry = ResolverRegistry::new();
        let env = Environment::default();
        let doc = Document::parse("a: 1\n", root_dir.path().join("upward.yml")).unwrap();
        let visitor = Visitor::new(&registry, &doc, &env);

        let definition = Definition::new(doc.path()).with("directory", Value::string("link"));
        let result = resolver.resolve(&visitor, &definition).await;

        assert!(matches!(
            result,
            Err(ResolverError::Security(PathSecurityError::SymlinkOutsideRoot { .. }))
        ));
        assert!(resolver.servers().is_empty());
    }

    #[test]
    fn test_max_age_follows_mode() {
        let development = DirectoryResolver::new(&options());
        assert_eq!(development.max_age(), Duration::ZERO);

        let production = DirectoryResolver::new(&ResolverOptions {
            mode: RuntimeMode::Production,
            ..Default::default()
        });
        assert_eq!(production.max_age(), Duration::from_secs(604_800));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolution_constructs_one_handler() {
        let registry = Arc::new(ResolverRegistry::with_defaults(&options()).unwrap());
        let doc = Arc::new(document("/srv/app/upward.yml", "handler:\n  directory: static\n"));
        let env = Arc::new(Environment::default());

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let doc = Arc::clone(&doc);
                let env = Arc::clone(&env);
                tokio::spawn(async move {
                    let visitor = Visitor::new(&registry, &doc, &env);
                    let artifact = visitor.upward_root("handler").await.unwrap();
                    artifact.into_handler().unwrap()
                })
            })
            .collect();

        let mut handlers = Vec::new();
        for task in tasks {
            handlers.push(task.await.unwrap());
        }

        assert!(handlers.iter().all(|h| Arc::ptr_eq(h, &handlers[0])));
        // The cache holds the only reference besides the returned ones.
        assert_eq!(Arc::strong_count(&handlers[0]), handlers.len() + 1);
    }
}
