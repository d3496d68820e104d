// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph ergonomics metrics (§4.5).

use serde::{Deserialize, Serialize};

use crate::model::Graph;

const VERY_LARGE_GRAPH_THRESHOLD: usize = 120;
const HIGH_FANOUT_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub max_out_degree: usize,
    pub summary_node_count: usize,
    pub flags: Vec<&'static str>,
}

/// Compute node/edge counts, max out-degree, summary-node count, and the
/// ergonomics flag list (§4.5).
pub fn compute_metrics(graph: &Graph) -> GraphMetrics {
    let node_count = graph.nodes.len();
    let edge_count = graph.edges.len();
    let max_out_degree = graph.out_degrees().values().copied().max().unwrap_or(0);
    let summary_node_count = graph.nodes.iter().filter(|n| n.object_type == "SUMMARY").count();

    let mut flags = Vec::new();
    if node_count > VERY_LARGE_GRAPH_THRESHOLD {
        flags.push("very_large_graph");
    }
    if max_out_degree > HIGH_FANOUT_THRESHOLD {
        flags.push("high_fanout");
    }
    if summary_node_count > 0 {
        flags.push("summary_nodes_present");
    }
    if flags.is_empty() {
        flags.push("ok");
    }

    GraphMetrics { node_count, edge_count, max_out_degree, summary_node_count, flags }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node};

    #[test]
    fn ok_flag_when_nothing_notable() {
        let mut g = Graph::default();
        g.upsert_node(Node::new("N_1", "CUBE", "ZCUBE"));
        let metrics = compute_metrics(&g);
        assert_eq!(metrics.flags, vec!["ok"]);
    }

    #[test]
    fn flags_high_fanout_and_summary_nodes() {
        let mut g = Graph::default();
        g.upsert_node(Node::new("N_ROOT", "QUERY", "ROOT"));
        g.upsert_node(Node::new("S_FILTER_MORE", "SUMMARY", "filter more"));
        for i in 0..25 {
            let id = format!("N_{i}");
            g.upsert_node(Node::new(&id, "FILTER", &id));
            g.upsert_edge(Edge { id: format!("E{i}"), from: "N_ROOT".into(), to: id, edge_type: "component_ref".into(), role: None });
        }
        let metrics = compute_metrics(&g);
        assert!(metrics.flags.contains(&"high_fanout"));
        assert!(metrics.flags.contains(&"summary_nodes_present"));
        assert!(!metrics.flags.contains(&"ok"));
    }
}
