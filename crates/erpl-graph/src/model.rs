// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph node/edge model shared by lineage, query, and infoarea-export
//! graphs (§4.5).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A typed node. `id` is unique within its owning [`Graph`] (§8 invariant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub object_type: String,
    pub name: String,
    pub description: Option<String>,
    pub uri: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    pub fn new(id: impl Into<String>, object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            name: name.into(),
            description: None,
            uri: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// A typed, directed edge. Every edge endpoint MUST resolve to a node id
/// present in the owning graph (§8 invariant).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub edge_type: String,
    pub role: Option<String>,
}

/// One entry in the `provenance` log: every endpoint call, success or
/// failure, in call order (§4.5 step 10).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub operation: String,
    pub endpoint: String,
    pub status: String,
}

/// A node/edge graph plus the operational record of how it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub provenance: Vec<ProvenanceEntry>,
    pub warnings: Vec<String>,
}

impl Graph {
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Insert `node` unless a node with the same id is already present.
    pub fn upsert_node(&mut self, node: Node) {
        if !self.has_node(&node.id) {
            self.nodes.push(node);
        }
    }

    /// Insert `edge` unless an identical `(from,to,type,role)` edge (or
    /// the same id) is already present.
    pub fn upsert_edge(&mut self, edge: Edge) {
        let dup = self.edges.iter().any(|e| {
            e.id == edge.id || (e.from == edge.from && e.to == edge.to && e.edge_type == edge.edge_type && e.role == edge.role)
        });
        if !dup {
            self.edges.push(edge);
        }
    }

    pub fn record(&mut self, operation: impl Into<String>, endpoint: impl Into<String>, status: impl Into<String>) {
        self.provenance.push(ProvenanceEntry { operation: operation.into(), endpoint: endpoint.into(), status: status.into() });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Out-degree of every node that appears as an edge source.
    pub fn out_degrees(&self) -> BTreeMap<&str, usize> {
        let mut degrees: BTreeMap<&str, usize> = BTreeMap::new();
        for edge in &self.edges {
            *degrees.entry(edge.from.as_str()).or_insert(0) += 1;
        }
        degrees
    }
}

/// Sanitize a name for use in a node id: non-alphanumeric, non-`_`/`-`
/// characters become `_` (§4.5).
pub fn sanitize_for_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

/// Build a `N_<TYPE>_<SANITIZED_NAME>` node id (§4.5).
pub fn component_node_id(object_type: &str, name: &str) -> String {
    format!("N_{}_{}", object_type.to_ascii_uppercase(), sanitize_for_id(name))
}
