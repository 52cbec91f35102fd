//! FLC Tools module
//!
//! MCP tool implementations for Food Label Compliance.

pub mod audit;
pub mod status;
