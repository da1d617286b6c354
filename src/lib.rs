//! Upward Server Library
//!
//! This crate serves HTTP requests according to a declarative definition
//! document. Each property of the document is resolved on demand by a
//! resolver chosen from the property's shape, and the entry property
//! resolves to the handler that answers every request.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling, the dispatcher and the HTTP transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **definition**: The definition document and its value model
//!   - **resolvers**: The resolver registry, the visitor that walks a document, and the handlers resolvers produce
//!
//! # Example
//!
//! ```rust,no_run
//! use upward_server::core::{Config, HttpTransport, UpwardServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = UpwardServer::load(config.clone()).await?;
//!     HttpTransport::new(config.http).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, Result, UpwardServer};
