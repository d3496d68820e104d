// SPDX-License-Identifier: MIT OR Apache-2.0
//! Single-query-focus BW query graph assembly: recursive component
//! resolution with dedup (§4.5).

use std::collections::{BTreeSet, VecDeque};

use async_trait::async_trait;
use erpl_error::Error;
use erpl_xml::bw::query::QueryDetail;

use crate::model::{component_node_id, Edge, Graph, Node};

/// Component kinds that are themselves resolvable into a further
/// `QueryDetail` (§4.5).
const QUERY_FAMILY_TYPES: &[&str] = &["query", "variable", "rkf", "ckf", "filter", "structure"];

/// Fetches one BW query component's detail document by type and name.
/// Implemented against a live session in `erpl-cli`/`erpl-mcp`; tests
/// inject a queue-backed fake (per the source's own mocking seam).
#[async_trait]
pub trait QueryComponentFetcher {
    async fn fetch_component(&self, component_type: &str, name: &str) -> Result<QueryDetail, Error>;
}

fn is_query_family(kind: &str) -> bool {
    QUERY_FAMILY_TYPES.contains(&kind.to_ascii_lowercase().as_str())
}

/// Assemble the query graph rooted at `(root_type, root_name)`.
pub async fn assemble_query_graph(
    fetcher: &dyn QueryComponentFetcher,
    root_type: &str,
    root_name: &str,
) -> Graph {
    let mut graph = Graph::default();
    let mut visited: BTreeSet<(String, String)> = BTreeSet::new();
    let mut frontier: VecDeque<(String, String)> = VecDeque::new();
    frontier.push_back((root_type.to_string(), root_name.to_string()));

    while let Some((kind, name)) = frontier.pop_front() {
        let key = (kind.to_ascii_uppercase(), name.clone());
        if visited.contains(&key) {
            continue;
        }
        visited.insert(key.clone());

        let node_id = component_node_id(&kind, &name);
        graph.upsert_node(Node::new(node_id.clone(), kind.to_ascii_uppercase(), name.clone()));

        let endpoint = format!("/sap/bw/modeling/{}/{name}", kind.to_ascii_lowercase());
        match fetcher.fetch_component(&kind, &name).await {
            Ok(detail) => {
                graph.record("GetQueryComponent", &endpoint, "ok");
                if detail.components.is_empty() {
                    graph.warn(format!("No references discovered for {node_id}"));
                }
                for component in &detail.components {
                    let child_id = component_node_id(&component.kind, &component.name);
                    let mut child = Node::new(child_id.clone(), component.kind.to_ascii_uppercase(), component.name.clone());
                    child.description = component.description.clone();
                    graph.upsert_node(child);

                    let edge_id = format!("E{}", graph.edges.len() + 1);
                    graph.upsert_edge(Edge {
                        id: edge_id,
                        from: node_id.clone(),
                        to: child_id,
                        edge_type: "component_ref".to_string(),
                        role: Some(component.role.clone()),
                    });

                    if is_query_family(&component.kind) {
                        let child_key = (component.kind.to_ascii_uppercase(), component.name.clone());
                        if !visited.contains(&child_key) {
                            frontier.push_back((component.kind.clone(), component.name.clone()));
                        }
                    }
                }
            }
            Err(e) => {
                graph.record("GetQueryComponent", &endpoint, "error");
                graph.warn(format!("failed to resolve {node_id}: {e}"));
            }
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpl_xml::bw::query::QueryComponent;
    use erpl_xml::bw::ObjectRefLite;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeFetcher {
        responses: Mutex<HashMap<(String, String), QueryDetail>>,
    }

    #[async_trait]
    impl QueryComponentFetcher for FakeFetcher {
        async fn fetch_component(&self, component_type: &str, name: &str) -> Result<QueryDetail, Error> {
            let key = (component_type.to_ascii_uppercase(), name.to_string());
            self.responses
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or_else(|| Error::new("GetQueryComponent", name, "not found", erpl_error::ErrorKind::NotFound))
        }
    }

    #[tokio::test]
    async fn recursively_resolves_query_family_and_dedups() {
        let mut responses = HashMap::new();
        responses.insert(
            ("QUERY".to_string(), "ZQUERY".to_string()),
            QueryDetail {
                name: "ZQUERY".to_string(),
                info_provider: ObjectRefLite::default(),
                components: vec![
                    QueryComponent { kind: "variable".into(), role: "filter".into(), name: "ZVAR".into(), description: None, reference: None },
                    QueryComponent { kind: "characteristic".into(), role: "rows".into(), name: "0CUSTOMER".into(), description: None, reference: None },
                ],
            },
        );
        responses.insert(
            ("VARIABLE".to_string(), "ZVAR".to_string()),
            QueryDetail { name: "ZVAR".to_string(), info_provider: ObjectRefLite::default(), components: vec![] },
        );
        let fetcher = FakeFetcher { responses: Mutex::new(responses) };

        let graph = assemble_query_graph(&fetcher, "QUERY", "ZQUERY").await;
        assert!(graph.has_node("N_QUERY_ZQUERY"));
        assert!(graph.has_node("N_VARIABLE_ZVAR"));
        assert!(graph.has_node("N_CHARACTERISTIC_0CUSTOMER"));
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.warnings.iter().any(|w| w.contains("N_VARIABLE_ZVAR")));
    }
}
