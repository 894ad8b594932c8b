//! Bedrock Investment Advisor MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing investment-advisory tools.
//! Each tool call is validated against its schema, turned into a prompt, and
//! answered by an Amazon Bedrock model.

pub mod bedrock;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;

pub use config::Config;
pub use error::{AdvisorMcpError, Result};
