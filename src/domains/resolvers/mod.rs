//! Resolvers domain module.
//!
//! This module is the resolution engine: it interprets a definition tree and
//! compiles each definition, on demand, into a value or a request handler.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual resolver types (one file per resolver)
//! - `registry.rs` - Telltale-to-resolver registration and lookup
//! - `visitor.rs` - Recursive resolution driver
//! - `cache.rs` - Compute-if-absent cache for expensive artifacts
//! - `handlers.rs` - The request handler interface and static file handler
//! - `service.rs` - Owns document, registry and environment
//!
//! ## Adding a New Resolver
//!
//! 1. Create a new file in `definitions/` (e.g., `my_resolver.rs`)
//! 2. Implement the `Resolver` trait
//! 3. Export in `definitions/mod.rs`
//! 4. Register in `registry.rs`
//!
//! **No need to modify `visitor.rs`!**

mod cache;
pub mod definitions;
mod error;
mod handlers;
mod registry;
mod service;
mod visitor;

pub use cache::ResourceCache;
pub use definitions::{Artifact, Resolver};
pub use error::{HandlerError, HandlerResult, ResolverError, ResolverResult};
pub use handlers::*;
pub use registry::{ResolverOptions, ResolverRegistry};
pub use service::ResolutionService;
pub use visitor::{Environment, Visitor};
