// Security module for path resolution and containment
//
// Resolvers turn document-relative paths into absolute ones here, and
// optionally confine them to a configured root directory.

pub mod path_validator;

pub use path_validator::{PathSecurityError, ensure_within_root, normalize, resolve_against};
