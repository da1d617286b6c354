//! Domains module containing business logic organized by bounded contexts.
//!
//! - **definition**: parsing the definition document into values
//! - **resolvers**: turning those values into concrete artifacts and handlers

pub mod definition;
pub mod resolvers;
