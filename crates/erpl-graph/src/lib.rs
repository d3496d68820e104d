// SPDX-License-Identifier: MIT OR Apache-2.0
//! BW graph assembler: lineage/query graph composition, reduction,
//! upstream merge, Mermaid rendering, and catalog export.

pub mod catalog;
pub mod export;
pub mod merge;
pub mod mermaid;
pub mod metrics;
pub mod model;
pub mod query_graph;
pub mod reduce;

pub use catalog::render_catalog;
pub use export::{export_infoarea, BwFetcher, ExportOptions, ExportResult, ExportedObject};
pub use merge::merge_upstream;
pub use mermaid::render_infoarea_mermaid;
pub use metrics::{compute_metrics, GraphMetrics};
pub use model::{component_node_id, sanitize_for_id, Edge, Graph, Node, ProvenanceEntry};
pub use query_graph::{assemble_query_graph, QueryComponentFetcher};
pub use reduce::reduce_by_role;
