//! Resolver-specific error types.

use http::StatusCode;
use thiserror::Error;

use crate::core::security::PathSecurityError;
use crate::domains::definition::Definition;

/// Result type for resolution.
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Errors that can occur while resolving a definition.
///
/// Everything except `Io` is a configuration error: it points at a mistake
/// in the definition document and names the offending definition or
/// property.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A required property is absent.
    #[error("'{property}' argument is required: {definition}")]
    MissingProperty { property: String, definition: String },

    /// A property resolved to a value of the wrong shape.
    #[error("'{property}' argument to {resolver} resolver must be a {expected}, but was a: {found}")]
    InvalidType {
        resolver: &'static str,
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    /// No registered telltale appears on the definition.
    #[error("No resolver matches definition {definition}; expected one of: {known}")]
    NoMatchingResolver { definition: String, known: String },

    /// More than one registered telltale appears on the definition.
    #[error("Ambiguous definition {definition}: matches telltales {telltales}")]
    AmbiguousDefinition { definition: String, telltales: String },

    /// Two resolver types claim the same telltale.
    #[error("Telltale '{telltale}' is already claimed by resolver '{existing}', cannot register '{incoming}'")]
    DuplicateTelltale {
        telltale: &'static str,
        existing: &'static str,
        incoming: &'static str,
    },

    /// A reference chain loops back on itself.
    #[error("Circular definition: {chain}")]
    CircularDefinition { chain: String },

    /// A reference points at nothing.
    #[error("Unresolved reference '{reference}'")]
    UnresolvedReference { reference: String },

    /// A handler was expected but the definition produced a value.
    #[error("Property '{property}' must resolve to a request handler, but resolved to a: {found}")]
    NotAHandler {
        property: String,
        found: &'static str,
    },

    /// The requested encoding is not supported.
    #[error("Unsupported encoding '{encoding}' for {resolver} resolver")]
    UnsupportedEncoding {
        resolver: &'static str,
        encoding: String,
    },

    /// A resolved path escapes the configured root directory.
    #[error(transparent)]
    Security(#[from] PathSecurityError),

    /// I/O failure from a resolver's collaborator.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    /// Create a "missing property" error.
    pub fn missing_property(property: impl Into<String>, definition: &Definition) -> Self {
        Self::MissingProperty {
            property: property.into(),
            definition: definition.to_string(),
        }
    }

    /// Create an "invalid type" error.
    pub fn invalid_type(
        resolver: &'static str,
        property: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::InvalidType {
            resolver,
            property: property.into(),
            expected,
            found,
        }
    }

    /// Create an "unresolved reference" error.
    pub fn unresolved(reference: impl ToString) -> Self {
        Self::UnresolvedReference {
            reference: reference.to_string(),
        }
    }

    /// Whether the error stems from the definition document rather than a
    /// collaborator.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Result type for request handling.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Errors surfaced by a handler while serving a request.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The requested file does not exist under the handler's directory.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// I/O failure while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HandlerError {
    /// Create a "not found" error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// HTTP status that corresponds to this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
