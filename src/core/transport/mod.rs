//! Transport layer for the upward server.
//!
//! The HTTP transport accepts requests with axum and hands every request,
//! apart from the optional health endpoint, to the server's dispatcher.

mod config;
mod error;
pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use self::http::HttpTransport;
