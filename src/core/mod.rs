//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the server,
//! including error handling, configuration, path security, the request
//! dispatcher, and the transport layer.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use security::PathSecurityError;
pub use server::UpwardServer;
pub use transport::{HttpConfig, HttpTransport};
