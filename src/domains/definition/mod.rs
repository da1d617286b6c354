//! Definition domain module.
//!
//! Definitions are the declarative configuration tree that the resolution
//! engine interprets. This module owns their data model and the loader that
//! parses a document file into one.
//!
//! ## Architecture
//!
//! - `model.rs` - `Definition`, `Value` and `Reference`
//! - `document.rs` - Document loading and provenance
//! - `error.rs` - Loader error types

mod document;
mod error;
mod model;

pub use document::Document;
pub use error::{DefinitionError, DefinitionResult};
pub use model::{Definition, Reference, Value, json_kind};
