//! Operation catalog module
//!
//! Contains the operation registry, input schemas, argument validation, and
//! prompt templates.

pub mod prompts;
pub mod registry;
pub mod schema;
pub mod validator;
