//! MCP (Model Context Protocol) module
//!
//! Implements the MCP server protocol and tool dispatch.

pub mod server;
pub mod tools;
pub mod types;
