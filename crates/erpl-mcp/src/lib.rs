// SPDX-License-Identifier: MIT OR Apache-2.0
//! MCP tool registry and JSON-RPC stdio server for the ADT/BW client
//! (§4.6, §6.2). The `erpl-cli` binary wires [`serve`] to real stdio; the
//! same [`erpl_core`] functions the CLI router dispatches to are called
//! here, so behavior stays identical across both front ends.

pub mod handlers;
pub mod registry;
pub mod server;

pub use handlers::{execute, ContentItem, ToolResult};
pub use registry::{tool_definitions, ToolDefinition};
pub use server::serve;
