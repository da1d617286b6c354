//! Definition documents.
//!
//! A document is a YAML (or JSON) file whose root mapping is the top-level
//! definition. The document's absolute path is the base for relative paths
//! used by resolvers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{DefinitionError, DefinitionResult};
use super::model::{Definition, json_kind};

/// A parsed definition document.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    root: Definition,
}

impl Document {
    /// Parse document `contents` that were read from `path`.
    ///
    /// Relative paths are made absolute against the current directory.
    pub fn parse(contents: &str, path: impl Into<PathBuf>) -> DefinitionResult<Self> {
        let path = absolute(path.into());

        let parsed: serde_json::Value =
            serde_yaml::from_str(contents).map_err(|e| DefinitionError::parse(&path, e))?;

        let serde_json::Value::Object(map) = parsed else {
            return Err(DefinitionError::InvalidRoot {
                found: json_kind(&parsed),
                path,
            });
        };

        let root = Definition::from_json_map(map, Arc::new(path.clone()));
        debug!(
            path = %path.display(),
            properties = root.len(),
            "Parsed definition document"
        );

        Ok(Self { path, root })
    }

    /// Read and parse the document at `path`.
    pub async fn load(path: impl AsRef<Path>) -> DefinitionResult<Self> {
        let path = path.as_ref();
        info!("Loading definition document: {}", path.display());

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DefinitionError::read(path, e))?;

        Self::parse(&contents, path)
    }

    /// Absolute path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The top-level definition.
    pub fn root(&self) -> &Definition {
        &self.root
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::path::absolute(&path).unwrap_or(path)
}
