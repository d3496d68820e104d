// SPDX-License-Identifier: MIT OR Apache-2.0
//! Upstream merge: compose a lineage graph into a query graph (§4.5).

use crate::model::{Edge, Graph, Node, ProvenanceEntry};

const LINEAGE_PREFIX: &str = "L_";

/// Merge `lineage` into `query_graph`, remapping lineage node ids with
/// prefix `L_`, synthesizing an `N_PROVIDER_<info_provider>` node when
/// `info_provider` is given, and bridging from the provider (or the
/// query root) to the lineage root with an `upstream_bridge` edge. All
/// lineage edges become `upstream_lineage`-typed in the merged graph.
/// Lineage provenance is preserved under `lineage:<op>:<status>:<endpoint>`.
pub fn merge_upstream(
    query_graph: &Graph,
    query_root_id: &str,
    lineage: &Graph,
    lineage_root_id: &str,
    info_provider: Option<&str>,
) -> Graph {
    let mut merged = query_graph.clone();

    for node in &lineage.nodes {
        let mut remapped = node.clone();
        remapped.id = format!("{LINEAGE_PREFIX}{}", node.id);
        merged.upsert_node(remapped);
    }
    for edge in &lineage.edges {
        let edge_id = format!("E{}", merged.edges.len() + 1);
        merged.upsert_edge(Edge {
            id: edge_id,
            from: format!("{LINEAGE_PREFIX}{}", edge.from),
            to: format!("{LINEAGE_PREFIX}{}", edge.to),
            edge_type: "upstream_lineage".to_string(),
            role: edge.role.clone(),
        });
    }

    let bridge_from = if let Some(provider) = info_provider {
        let provider_id = format!("N_PROVIDER_{}", crate::model::sanitize_for_id(provider));
        merged.upsert_node(Node::new(provider_id.clone(), "PROVIDER", provider));
        provider_id
    } else {
        query_root_id.to_string()
    };
    let bridge_to = format!("{LINEAGE_PREFIX}{lineage_root_id}");
    if merged.has_node(&bridge_to) {
        let edge_id = format!("E{}", merged.edges.len() + 1);
        merged.upsert_edge(Edge { id: edge_id, from: bridge_from, to: bridge_to, edge_type: "upstream_bridge".to_string(), role: None });
    }

    for entry in &lineage.provenance {
        merged.provenance.push(ProvenanceEntry {
            operation: format!("lineage:{}:{}:{}", entry.operation, entry.status, entry.endpoint),
            endpoint: entry.endpoint.clone(),
            status: entry.status.clone(),
        });
    }
    merged.warnings.extend(lineage.warnings.iter().cloned());

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineage_graph() -> Graph {
        let mut g = Graph::default();
        g.upsert_node(Node::new("N_ADSO_ZADSO", "ADSO", "ZADSO"));
        g.upsert_node(Node::new("N_RSDS_ZSRC", "RSDS", "ZSRC"));
        g.upsert_edge(Edge { id: "E1".into(), from: "N_RSDS_ZSRC".into(), to: "N_ADSO_ZADSO".into(), edge_type: "field_mapping".into(), role: None });
        g.record("GetTransformation", "/x/trfn", "ok");
        g
    }

    #[test]
    fn remaps_lineage_nodes_and_bridges_from_provider() {
        let mut query_graph = Graph::default();
        query_graph.upsert_node(Node::new("N_QUERY_ROOT", "QUERY", "ROOT"));

        let lineage = lineage_graph();
        let merged = merge_upstream(&query_graph, "N_QUERY_ROOT", &lineage, "N_ADSO_ZADSO", Some("ZCUBE"));

        assert!(merged.has_node("L_N_ADSO_ZADSO"));
        assert!(merged.has_node("L_N_RSDS_ZSRC"));
        assert!(merged.has_node("N_PROVIDER_ZCUBE"));
        assert!(merged.edges.iter().any(|e| e.edge_type == "upstream_bridge" && e.from == "N_PROVIDER_ZCUBE"));
        assert!(merged.edges.iter().any(|e| e.edge_type == "upstream_lineage"));
        assert!(merged.provenance.iter().any(|p| p.operation.starts_with("lineage:GetTransformation:ok:")));
    }

    #[test]
    fn bridges_from_query_root_without_provider() {
        let mut query_graph = Graph::default();
        query_graph.upsert_node(Node::new("N_QUERY_ROOT", "QUERY", "ROOT"));
        let lineage = lineage_graph();
        let merged = merge_upstream(&query_graph, "N_QUERY_ROOT", &lineage, "N_ADSO_ZADSO", None);
        assert!(merged.edges.iter().any(|e| e.edge_type == "upstream_bridge" && e.from == "N_QUERY_ROOT"));
    }
}
