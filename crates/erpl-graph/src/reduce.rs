// SPDX-License-Identifier: MIT OR Apache-2.0
//! Query graph reduction: cap the number of nodes shown for one role,
//! folding the rest into a synthetic summary node (§4.5).

use std::collections::BTreeMap;

use crate::model::{Edge, Graph};

/// Reduce `graph` so that at most `max_nodes_per_role` non-summary nodes
/// with role `focus_role` remain directly visible; the rest are folded
/// into a `S_<ROLE>_MORE` summary node (suffixed `_2`, `_3`, … on id
/// collision).
pub fn reduce_by_role(graph: &Graph, focus_role: &str, max_nodes_per_role: usize) -> Graph {
    let role_upper = focus_role.to_ascii_uppercase();

    // Children whose incoming edge carries the focus role, sorted by id
    // for determinism.
    let mut role_children: Vec<String> = graph
        .edges
        .iter()
        .filter(|e| e.role.as_deref().map(|r| r.eq_ignore_ascii_case(focus_role)).unwrap_or(false))
        .map(|e| e.to.clone())
        .collect();
    role_children.sort();
    role_children.dedup();

    if role_children.len() <= max_nodes_per_role {
        return graph.clone();
    }

    let kept: Vec<&String> = role_children.iter().take(max_nodes_per_role).collect();
    let omitted: Vec<&String> = role_children.iter().skip(max_nodes_per_role).collect();

    let mut summary_id = format!("S_{role_upper}_MORE");
    let mut suffix = 2;
    while graph.has_node(&summary_id) {
        summary_id = format!("S_{role_upper}_MORE_{suffix}");
        suffix += 1;
    }

    let mut reduced = Graph { nodes: Vec::new(), edges: Vec::new(), provenance: graph.provenance.clone(), warnings: graph.warnings.clone() };

    for node in &graph.nodes {
        if !omitted.iter().any(|o| **o == node.id) {
            reduced.nodes.push(node.clone());
        }
    }
    let mut summary_node = crate::model::Node::new(summary_id.clone(), "SUMMARY", format!("{} more", role_upper));
    summary_node.attributes.insert("summary_count".to_string(), omitted.len().to_string());
    reduced.nodes.push(summary_node);

    let omitted_set: std::collections::BTreeSet<&String> = omitted.into_iter().collect();
    let mut edge_id_counter = 0usize;
    let mut dedup: BTreeMap<(String, String, String, Option<String>), ()> = BTreeMap::new();

    for edge in &graph.edges {
        let redirected_to = if omitted_set.contains(&edge.to) { summary_id.clone() } else { edge.to.clone() };
        if redirected_to == edge.from {
            continue; // dropped: would become a self-loop
        }
        let key = (edge.from.clone(), redirected_to.clone(), edge.edge_type.clone(), edge.role.clone());
        if dedup.contains_key(&key) {
            continue;
        }
        dedup.insert(key, ());
        edge_id_counter += 1;
        reduced.edges.push(Edge {
            id: format!("E{edge_id_counter}"),
            from: edge.from.clone(),
            to: redirected_to,
            edge_type: edge.edge_type.clone(),
            role: edge.role.clone(),
        });
    }

    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn sample_graph() -> Graph {
        let mut g = Graph::default();
        g.upsert_node(Node::new("N_QUERY_ROOT", "QUERY", "ROOT"));
        for name in ["A", "B", "C"] {
            g.upsert_node(Node::new(format!("N_FILTER_{name}"), "FILTER", name));
            g.upsert_edge(Edge {
                id: format!("E_{name}"),
                from: "N_QUERY_ROOT".into(),
                to: format!("N_FILTER_{name}"),
                edge_type: "component_ref".into(),
                role: Some("filter".into()),
            });
        }
        g.upsert_node(Node::new("N_STRUCTURE_COL", "STRUCTURE", "COL"));
        g.upsert_edge(Edge {
            id: "E_col".into(),
            from: "N_QUERY_ROOT".into(),
            to: "N_STRUCTURE_COL".into(),
            edge_type: "component_ref".into(),
            role: Some("structure".into()),
        });
        g
    }

    #[test]
    fn reduces_filter_children_to_one_plus_summary() {
        let graph = sample_graph();
        let reduced = reduce_by_role(&graph, "filter", 1);
        assert!(reduced.has_node("N_FILTER_A"));
        assert!(!reduced.has_node("N_FILTER_B"));
        assert!(!reduced.has_node("N_FILTER_C"));
        assert!(reduced.has_node("S_FILTER_MORE"));
        let summary = reduced.nodes.iter().find(|n| n.id == "S_FILTER_MORE").unwrap();
        assert_eq!(summary.attributes.get("summary_count").unwrap(), "2");
        assert!(reduced.has_node("N_STRUCTURE_COL"));

        let summary_edges: Vec<_> = reduced.edges.iter().filter(|e| e.to == "S_FILTER_MORE").collect();
        assert_eq!(summary_edges.len(), 1);
    }

    #[test]
    fn below_threshold_is_unchanged() {
        let graph = sample_graph();
        let reduced = reduce_by_role(&graph, "filter", 10);
        assert_eq!(reduced.nodes.len(), graph.nodes.len());
    }
}
