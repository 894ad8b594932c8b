//! Bedrock runtime module
//!
//! Contains the model family adapters, wire types, and the runtime client.

pub mod client;
pub mod family;
pub mod types;
