// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core ADT/BW operations: one function per tool/command, shared verbatim
//! by the CLI router (`erpl-cli`) and the MCP tool registry (`erpl-mcp`).
//! Every function takes an [`erpl_session::AdtSession`] and returns
//! `Result<serde_json::Value, erpl_error::Error>` so both front ends can
//! render the same payload as a human table or as MCP tool-result text.

pub mod ddic;
pub mod discover;
pub mod graph;
pub mod objects;
pub mod package;
pub mod search;
pub mod testcheck;
pub mod transport;

pub use ddic::{read_cds, read_table};
pub use discover::discover;
pub use graph::{export_infoarea, export_query_graph, GraphExportRequest};
pub use objects::{create_object, delete_object, lock, read_object, read_source, unlock, write_source};
pub use package::{list_package, package_exists, package_tree};
pub use search::search;
pub use testcheck::{run_atc, run_tests};
pub use transport::{create_transport, list_transports, release_transport};
