//! Error types and handling for the upward server.
//!
//! This module defines a unified error type that can represent errors from
//! all domains and the transport, providing consistent error handling
//! across the entire application.

use thiserror::Error;

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the upward server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error loading or parsing the definition document.
    #[error("Definition error: {0}")]
    Definition(#[from] crate::domains::definition::DefinitionError),

    /// Error resolving a definition.
    #[error("Resolution error: {0}")]
    Resolver(#[from] crate::domains::resolvers::ResolverError),

    /// Error from the transport layer.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
