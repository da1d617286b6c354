//! Definition-document error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for definition loading.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Errors that can occur while reading or parsing a definition document.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The document could not be read from disk.
    #[error("Failed to read definition document '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML (or JSON).
    #[error("Failed to parse definition document '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document root is not a mapping of property names to values.
    #[error("Definition document '{path}' must have a mapping at its root, but found: {found}")]
    InvalidRoot { path: PathBuf, found: &'static str },
}

impl DefinitionError {
    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
