// SPDX-License-Identifier: MIT OR Apache-2.0
//! Infoarea export traversal: BFS over BW containers, collecting typed
//! objects and merging per-object lineage (§4.5 steps 1-10).

use std::collections::{BTreeSet, VecDeque};

use async_trait::async_trait;
use erpl_error::Error;
use erpl_xml::bw::nodes::BwNode;
use erpl_xml::bw::query::QueryDetail;
use erpl_xml::bw::transformation::TrfnDetail;
use erpl_xml::bw::ObjectRefLite;
use erpl_xml::DetailRecord;

use crate::model::{Edge, Graph, Node};

/// Per-type supplementary detail attached to an exported object (§4.5
/// step 5). ADSO/RSDS detail is a flat field harvest (§4.8's shared
/// normalization); DTP and TRFN share the same source/target/rule shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectDetail {
    Adso(DetailRecord),
    Rsds { source_system: String, record: DetailRecord },
    Dataflow(TrfnDetail),
}

/// One non-container object discovered during the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedObject {
    pub object_type: String,
    pub name: String,
    pub description: String,
    pub uri: Option<String>,
    pub detail: Option<ObjectDetail>,
}

/// Extract the source system segment BW encodes into an RSDS node's URI
/// (`.../rsds/<SOURCESYSTEM>/<NAME>`) — the path segment before the last.
pub fn source_system_from_uri(uri: &str) -> Option<String> {
    let segments: Vec<&str> = uri.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments[segments.len() - 2].to_string())
}

/// Everything the infoarea export traversal needs from the live system.
/// A real implementation wraps an `AdtSession` + `erpl-xml` parsers;
/// tests inject a queue-backed fake (source's own mocking seam, §9).
#[async_trait]
pub trait BwFetcher {
    /// `GetNodes`: list the children of a container, or of a
    /// `semanticalFolder` via its `endpoint_override` (§4.5 step 2).
    async fn get_nodes(&self, container_uri: &str, container_name: &str) -> Result<Vec<BwNode>, Error>;

    /// Fetch a TRFN's source/target refs for lineage merging, when the
    /// object is a TRFN (step 5). Other object types return `Ok(None)`.
    async fn get_transformation(&self, object_uri: &str) -> Result<Option<TrfnDetail>, Error>;

    /// ADSO field/property detail, when the object is an ADSO (step 5).
    async fn get_adso_detail(&self, object_uri: &str) -> Result<Option<DetailRecord>, Error>;

    /// RSDS field detail, keyed by the source system extracted from the
    /// node's own URI (step 5; see [`source_system_from_uri`]).
    async fn get_rsds_detail(&self, object_uri: &str, source_system: &str) -> Result<Option<DetailRecord>, Error>;

    /// A DTP's source/target refs, when the object is a DTP (step 5).
    /// Shares `TrfnDetail`'s shape since both are source/target/rule
    /// documents.
    async fn get_dtp_detail(&self, object_uri: &str) -> Result<Option<TrfnDetail>, Error>;

    /// BW search over the infoarea, used for `include_search_supplement`
    /// (step 6).
    async fn search(&self, infoarea: &str) -> Result<Vec<BwNode>, Error>;

    /// xref consumers of an infoprovider, used for `include_xref_edges`
    /// (step 7).
    async fn xref(&self, provider_uri: &str) -> Result<Vec<ObjectRefLite>, Error>;

    /// An `ELEM`'s query component (InfoProvider + dimensional refs),
    /// used for `include_elem_provider_edges` (step 8).
    async fn get_query_component(&self, elem_uri: &str) -> Result<Option<QueryDetail>, Error>;
}

const CONTAINER_TYPES: &[&str] = &["AREA", "semanticalFolder"];
/// Infoprovider types eligible for xref expansion (step 7).
const INFOPROVIDER_TYPES: &[&str] = &["CUBE", "MPRO", "HCPR", "ADSO", "DSO"];
/// Search-supplement admission list (step 6) — deliberately excludes
/// infoprovider types whose xrefs would explode into other areas.
const SEARCH_SUPPLEMENT_TYPES: &[&str] = &["ELEM", "IOBJ"];

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub max_depth: usize,
    pub types_filter: Option<Vec<String>>,
    pub include_search_supplement: bool,
    pub include_xref_edges: bool,
    pub include_elem_provider_edges: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_depth: 8,
            types_filter: None,
            include_search_supplement: false,
            include_xref_edges: false,
            include_elem_provider_edges: false,
        }
    }
}

/// Result of an infoarea export: the discovered objects plus the merged
/// dataflow graph and its provenance/warnings.
#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    pub objects: Vec<ExportedObject>,
    pub graph: Graph,
}

fn node_dedup_key(node: &BwNode) -> String {
    node.uri.clone().unwrap_or_else(|| node.object_name.clone())
}

/// Run the infoarea export traversal rooted at `infoarea_name` (§4.5).
pub async fn export_infoarea(fetcher: &dyn BwFetcher, infoarea_name: &str, options: ExportOptions) -> ExportResult {
    let mut graph = Graph::default();
    let mut objects = Vec::new();
    let mut visited_containers: BTreeSet<String> = BTreeSet::new();
    let mut frontier: VecDeque<(String, Option<String>, usize)> = VecDeque::new();
    frontier.push_back((infoarea_name.to_string(), None, 0));

    while let Some((name, uri, depth)) = frontier.pop_front() {
        let dedup_key = uri.clone().unwrap_or_else(|| name.clone());
        if visited_containers.contains(&dedup_key) {
            continue;
        }
        visited_containers.insert(dedup_key);

        let endpoint = uri.clone().unwrap_or_else(|| format!("/sap/bw/modeling/repo/infoproviderstructure/AREA/{name}"));
        match fetcher.get_nodes(&endpoint, &name).await {
            Ok(children) => {
                graph.record("GetNodes", &endpoint, "ok");
                for child in children {
                    if CONTAINER_TYPES.contains(&child.object_type.as_str()) {
                        if depth < options.max_depth {
                            frontier.push_back((child.object_name.clone(), child.uri.clone(), depth + 1));
                        }
                        continue;
                    }
                    if let Some(filter) = &options.types_filter {
                        if !filter.iter().any(|t| t == &child.object_type) {
                            continue;
                        }
                    }
                    let detail = match &child.uri {
                        Some(uri) => {
                            fetch_type_detail(fetcher, &mut graph, &child.object_type, &child.object_name, uri).await
                        }
                        None => None,
                    };
                    objects.push(ExportedObject {
                        object_type: child.object_type.clone(),
                        name: child.object_name.clone(),
                        description: child.description.clone(),
                        uri: child.uri.clone(),
                        detail,
                    });
                    let node_id = crate::model::component_node_id(&child.object_type, &child.object_name);
                    let mut node = Node::new(node_id, child.object_type.clone(), child.object_name.clone());
                    node.description = Some(child.description.clone());
                    node.uri = child.uri.clone();
                    graph.upsert_node(node);
                }
            }
            Err(e) => {
                graph.record("GetNodes", &endpoint, "error");
                graph.warn(format!("failed to list nodes under {name}: {e}"));
            }
        }
    }

    if options.include_search_supplement {
        match fetcher.search(infoarea_name).await {
            Ok(hits) => {
                graph.record("Search", infoarea_name, "ok");
                let present: BTreeSet<String> = objects.iter().map(node_dedup_key_from_exported).collect();
                for hit in hits {
                    if !SEARCH_SUPPLEMENT_TYPES.contains(&hit.object_type.as_str()) {
                        continue;
                    }
                    let key = node_dedup_key(&hit);
                    if present.contains(&key) {
                        continue;
                    }
                    objects.push(ExportedObject {
                        object_type: hit.object_type.clone(),
                        name: hit.object_name.clone(),
                        description: hit.description.clone(),
                        uri: hit.uri.clone(),
                        detail: None,
                    });
                    let node_id = crate::model::component_node_id(&hit.object_type, &hit.object_name);
                    graph.upsert_node(Node::new(node_id, hit.object_type, hit.object_name));
                }
            }
            Err(e) => {
                graph.record("Search", infoarea_name, "error");
                graph.warn(format!("search supplement failed: {e}"));
            }
        }
    }

    if options.include_xref_edges {
        let providers: Vec<ExportedObject> =
            objects.iter().filter(|o| INFOPROVIDER_TYPES.contains(&o.object_type.as_str())).cloned().collect();
        for provider in providers {
            let Some(uri) = &provider.uri else { continue };
            match fetcher.xref(uri).await {
                Ok(consumers) => {
                    graph.record("Xref", uri, "ok");
                    let provider_id = crate::model::component_node_id(&provider.object_type, &provider.name);
                    for consumer in consumers {
                        let consumer_id = crate::model::component_node_id(&consumer.object_type, &consumer.name);
                        graph.upsert_node(Node::new(consumer_id.clone(), consumer.object_type.clone(), consumer.name.clone()));
                        let edge_id = format!("E{}", graph.edges.len() + 1);
                        graph.upsert_edge(Edge {
                            id: edge_id,
                            from: provider_id.clone(),
                            to: consumer_id,
                            edge_type: "provider_consumer".to_string(),
                            role: None,
                        });
                    }
                }
                Err(e) => {
                    graph.record("Xref", uri, "error");
                    graph.warn(format!("xref failed for {}: {e}", provider.name));
                }
            }
        }
    }

    if options.include_elem_provider_edges {
        let elems: Vec<ExportedObject> = objects.iter().filter(|o| o.object_type == "ELEM").cloned().collect();
        for elem in elems {
            let Some(uri) = &elem.uri else { continue };
            match fetcher.get_query_component(uri).await {
                Ok(Some(detail)) => {
                    graph.record("GetQueryComponent", uri, "ok");
                    let elem_id = crate::model::component_node_id("ELEM", &elem.name);

                    for component in &detail.components {
                        if component.name.is_empty() {
                            continue;
                        }
                        let iobj_id = crate::model::component_node_id("IOBJ", &component.name);
                        graph.upsert_node(Node::new(iobj_id.clone(), "IOBJ", component.name.clone()));
                        let edge_id = format!("E{}", graph.edges.len() + 1);
                        graph.upsert_edge(Edge {
                            id: edge_id,
                            from: elem_id.clone(),
                            to: iobj_id,
                            edge_type: "component_ref".to_string(),
                            role: Some(component.kind.clone()),
                        });
                    }

                    if !detail.info_provider.name.is_empty() {
                        let provider_id =
                            crate::model::component_node_id(&detail.info_provider.object_type, &detail.info_provider.name);
                        let provider_present = graph.has_node(&provider_id);
                        let elem_has_incoming = graph.edges.iter().any(|e| e.to == elem_id);
                        if provider_present && !elem_has_incoming {
                            let edge_id = format!("E{}", graph.edges.len() + 1);
                            graph.upsert_edge(Edge {
                                id: edge_id,
                                from: provider_id,
                                to: elem_id,
                                edge_type: "elem-provider".to_string(),
                                role: None,
                            });
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    graph.record("GetQueryComponent", uri, "error");
                    graph.warn(format!("failed to fetch query component for {}: {e}", elem.name));
                }
            }
        }
    }

    ExportResult { objects, graph }
}

fn node_dedup_key_from_exported(o: &ExportedObject) -> String {
    o.uri.clone().unwrap_or_else(|| o.name.clone())
}

/// Fetch per-type detail for one object (step 5) and merge DTP/TRFN
/// source/target lineage into the graph as it goes.
async fn fetch_type_detail(
    fetcher: &dyn BwFetcher,
    graph: &mut Graph,
    object_type: &str,
    name: &str,
    uri: &str,
) -> Option<ObjectDetail> {
    match object_type {
        "TRFN" => match fetcher.get_transformation(uri).await {
            Ok(Some(detail)) => {
                graph.record("GetTransformation", uri, "ok");
                merge_transformation_lineage(graph, &detail);
                Some(ObjectDetail::Dataflow(detail))
            }
            Ok(None) => None,
            Err(e) => {
                graph.record("GetTransformation", uri, "error");
                graph.warn(format!("failed to fetch transformation {name}: {e}"));
                None
            }
        },
        "DTP" | "DTPA" => match fetcher.get_dtp_detail(uri).await {
            Ok(Some(detail)) => {
                graph.record("GetDtpDetail", uri, "ok");
                merge_transformation_lineage(graph, &detail);
                Some(ObjectDetail::Dataflow(detail))
            }
            Ok(None) => None,
            Err(e) => {
                graph.record("GetDtpDetail", uri, "error");
                graph.warn(format!("failed to fetch DTP detail for {name}: {e}"));
                None
            }
        },
        "ADSO" => match fetcher.get_adso_detail(uri).await {
            Ok(Some(record)) => {
                graph.record("GetAdsoDetail", uri, "ok");
                Some(ObjectDetail::Adso(record))
            }
            Ok(None) => None,
            Err(e) => {
                graph.record("GetAdsoDetail", uri, "error");
                graph.warn(format!("failed to fetch ADSO detail for {name}: {e}"));
                None
            }
        },
        "RSDS" => {
            let Some(source_system) = source_system_from_uri(uri) else {
                graph.warn(format!("could not derive source system from RSDS uri for {name}"));
                return None;
            };
            match fetcher.get_rsds_detail(uri, &source_system).await {
                Ok(Some(record)) => {
                    graph.record("GetRsdsDetail", uri, "ok");
                    Some(ObjectDetail::Rsds { source_system, record })
                }
                Ok(None) => None,
                Err(e) => {
                    graph.record("GetRsdsDetail", uri, "error");
                    graph.warn(format!("failed to fetch RSDS detail for {name}: {e}"));
                    None
                }
            }
        }
        _ => None,
    }
}

fn merge_transformation_lineage(graph: &mut Graph, detail: &TrfnDetail) {
    let source_id = crate::model::component_node_id(&detail.source.object_type, &detail.source.name);
    let target_id = crate::model::component_node_id(&detail.target.object_type, &detail.target.name);
    if detail.source.object_type.is_empty() || detail.target.object_type.is_empty() {
        return;
    }
    graph.upsert_node(Node::new(source_id.clone(), detail.source.object_type.clone(), detail.source.name.clone()));
    graph.upsert_node(Node::new(target_id.clone(), detail.target.object_type.clone(), detail.target.name.clone()));

    for rule in &detail.rules {
        for edge in erpl_xml::bw::transformation::rule_edges(rule) {
            let edge_id = format!("E{}", graph.edges.len() + 1);
            graph.upsert_edge(Edge {
                id: edge_id,
                from: source_id.clone(),
                to: target_id.clone(),
                edge_type: edge.edge_type.to_string(),
                role: Some(edge.to_field),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeFetcher {
        nodes_by_container: Mutex<HashMap<String, Vec<BwNode>>>,
    }

    #[async_trait]
    impl BwFetcher for FakeFetcher {
        async fn get_nodes(&self, container_uri: &str, _container_name: &str) -> Result<Vec<BwNode>, Error> {
            Ok(self.nodes_by_container.lock().unwrap().get(container_uri).cloned().unwrap_or_default())
        }
        async fn get_transformation(&self, _object_uri: &str) -> Result<Option<TrfnDetail>, Error> {
            Ok(None)
        }
        async fn get_adso_detail(&self, _object_uri: &str) -> Result<Option<DetailRecord>, Error> {
            Ok(None)
        }
        async fn get_rsds_detail(&self, _object_uri: &str, _source_system: &str) -> Result<Option<DetailRecord>, Error> {
            Ok(None)
        }
        async fn get_dtp_detail(&self, _object_uri: &str) -> Result<Option<TrfnDetail>, Error> {
            Ok(None)
        }
        async fn search(&self, _infoarea: &str) -> Result<Vec<BwNode>, Error> {
            Ok(vec![])
        }
        async fn xref(&self, _provider_uri: &str) -> Result<Vec<ObjectRefLite>, Error> {
            Ok(vec![])
        }
        async fn get_query_component(&self, _elem_uri: &str) -> Result<Option<QueryDetail>, Error> {
            Ok(None)
        }
    }

    fn node(object_type: &str, name: &str, uri: &str) -> BwNode {
        BwNode {
            uri: Some(uri.to_string()),
            description: format!("{name} desc"),
            object_name: name.to_string(),
            object_type: object_type.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn walks_containers_and_collects_leaves() {
        let root_uri = "/sap/bw/modeling/repo/infoproviderstructure/AREA/ZAREA";
        let mut containers = HashMap::new();
        containers.insert(
            root_uri.to_string(),
            vec![node("semanticalFolder", "ZFOLDER", "/x/folder"), node("ADSO", "ZADSO", "/x/adso")],
        );
        containers.insert("/x/folder".to_string(), vec![node("CUBE", "ZCUBE", "/x/cube")]);
        let fetcher = FakeFetcher { nodes_by_container: Mutex::new(containers) };

        let result = export_infoarea(&fetcher, "ZAREA", ExportOptions::default()).await;
        let names: BTreeSet<String> = result.objects.iter().map(|o| o.name.clone()).collect();
        assert!(names.contains("ZADSO"));
        assert!(names.contains("ZCUBE"));
        assert_eq!(result.graph.provenance.len(), 2);
    }

    #[tokio::test]
    async fn types_filter_excludes_non_matching_leaves() {
        let root_uri = "/sap/bw/modeling/repo/infoproviderstructure/AREA/ZAREA";
        let mut containers = HashMap::new();
        containers.insert(root_uri.to_string(), vec![node("ADSO", "ZADSO", "/x/adso"), node("CUBE", "ZCUBE", "/x/cube")]);
        let fetcher = FakeFetcher { nodes_by_container: Mutex::new(containers) };

        let options = ExportOptions { types_filter: Some(vec!["CUBE".to_string()]), ..ExportOptions::default() };
        let result = export_infoarea(&fetcher, "ZAREA", options).await;
        assert_eq!(result.objects.len(), 1);
        assert_eq!(result.objects[0].object_type, "CUBE");
    }

    struct ElemFetcher {
        nodes_by_container: Mutex<HashMap<String, Vec<BwNode>>>,
        query_components: HashMap<String, QueryDetail>,
    }

    #[async_trait]
    impl BwFetcher for ElemFetcher {
        async fn get_nodes(&self, container_uri: &str, _container_name: &str) -> Result<Vec<BwNode>, Error> {
            Ok(self.nodes_by_container.lock().unwrap().get(container_uri).cloned().unwrap_or_default())
        }
        async fn get_transformation(&self, _object_uri: &str) -> Result<Option<TrfnDetail>, Error> {
            Ok(None)
        }
        async fn get_adso_detail(&self, _object_uri: &str) -> Result<Option<DetailRecord>, Error> {
            Ok(None)
        }
        async fn get_rsds_detail(&self, _object_uri: &str, _source_system: &str) -> Result<Option<DetailRecord>, Error> {
            Ok(None)
        }
        async fn get_dtp_detail(&self, _object_uri: &str) -> Result<Option<TrfnDetail>, Error> {
            Ok(None)
        }
        async fn search(&self, _infoarea: &str) -> Result<Vec<BwNode>, Error> {
            Ok(vec![])
        }
        async fn xref(&self, _provider_uri: &str) -> Result<Vec<ObjectRefLite>, Error> {
            Ok(vec![])
        }
        async fn get_query_component(&self, elem_uri: &str) -> Result<Option<QueryDetail>, Error> {
            Ok(self.query_components.get(elem_uri).cloned())
        }
    }

    #[tokio::test]
    async fn elem_provider_edges_harvest_iobj_refs_and_bridge_from_provider() {
        use erpl_xml::bw::query::QueryComponent;

        let root_uri = "/sap/bw/modeling/repo/infoproviderstructure/AREA/ZAREA";
        let mut containers = HashMap::new();
        containers.insert(root_uri.to_string(), vec![node("CUBE", "ZCUBE", "/x/cube"), node("ELEM", "ZELEM", "/x/elem")]);

        let mut query_components = HashMap::new();
        query_components.insert(
            "/x/elem".to_string(),
            QueryDetail {
                name: "ZELEM".to_string(),
                info_provider: ObjectRefLite { object_type: "CUBE".to_string(), name: "ZCUBE".to_string(), uri: Some("/x/cube".to_string()) },
                components: vec![QueryComponent {
                    kind: "characteristic".to_string(),
                    role: "rows".to_string(),
                    name: "0CUSTOMER".to_string(),
                    description: None,
                    reference: None,
                }],
            },
        );

        let fetcher = ElemFetcher { nodes_by_container: Mutex::new(containers), query_components };
        let options = ExportOptions { include_elem_provider_edges: true, ..ExportOptions::default() };
        let result = export_infoarea(&fetcher, "ZAREA", options).await;

        let elem_id = crate::model::component_node_id("ELEM", "ZELEM");
        let provider_id = crate::model::component_node_id("CUBE", "ZCUBE");
        let iobj_id = crate::model::component_node_id("IOBJ", "0CUSTOMER");

        assert!(result.graph.has_node(&iobj_id));
        assert!(result
            .graph
            .edges
            .iter()
            .any(|e| e.from == elem_id && e.to == iobj_id && e.edge_type == "component_ref" && e.role.as_deref() == Some("characteristic")));
        assert!(result.graph.edges.iter().any(|e| e.from == provider_id && e.to == elem_id && e.edge_type == "elem-provider"));
    }

    struct DetailFetcher {
        nodes_by_container: Mutex<HashMap<String, Vec<BwNode>>>,
        adso: HashMap<String, DetailRecord>,
        rsds: HashMap<String, DetailRecord>,
        dtp: HashMap<String, TrfnDetail>,
    }

    #[async_trait]
    impl BwFetcher for DetailFetcher {
        async fn get_nodes(&self, container_uri: &str, _container_name: &str) -> Result<Vec<BwNode>, Error> {
            Ok(self.nodes_by_container.lock().unwrap().get(container_uri).cloned().unwrap_or_default())
        }
        async fn get_transformation(&self, _object_uri: &str) -> Result<Option<TrfnDetail>, Error> {
            Ok(None)
        }
        async fn get_adso_detail(&self, object_uri: &str) -> Result<Option<DetailRecord>, Error> {
            Ok(self.adso.get(object_uri).cloned())
        }
        async fn get_rsds_detail(&self, object_uri: &str, _source_system: &str) -> Result<Option<DetailRecord>, Error> {
            Ok(self.rsds.get(object_uri).cloned())
        }
        async fn get_dtp_detail(&self, object_uri: &str) -> Result<Option<TrfnDetail>, Error> {
            Ok(self.dtp.get(object_uri).cloned())
        }
        async fn search(&self, _infoarea: &str) -> Result<Vec<BwNode>, Error> {
            Ok(vec![])
        }
        async fn xref(&self, _provider_uri: &str) -> Result<Vec<ObjectRefLite>, Error> {
            Ok(vec![])
        }
        async fn get_query_component(&self, _elem_uri: &str) -> Result<Option<QueryDetail>, Error> {
            Ok(None)
        }
    }

    #[test]
    fn source_system_extracted_from_rsds_uri_second_to_last_segment() {
        assert_eq!(source_system_from_uri("/sap/bw/modeling/rsds/PRODSYS/0CUSTOMER").as_deref(), Some("PRODSYS"));
        assert_eq!(source_system_from_uri("ZNAME"), None);
    }

    #[tokio::test]
    async fn attaches_per_type_detail_for_adso_rsds_and_dtp() {
        let root_uri = "/sap/bw/modeling/repo/infoproviderstructure/AREA/ZAREA";
        let mut containers = HashMap::new();
        containers.insert(
            root_uri.to_string(),
            vec![
                node("ADSO", "ZADSO", "/x/adso"),
                node("RSDS", "0CUSTOMER", "/sap/bw/modeling/rsds/PRODSYS/0CUSTOMER"),
                node("DTP", "ZDTP", "/x/dtp"),
            ],
        );

        let mut adso = HashMap::new();
        adso.insert("/x/adso".to_string(), DetailRecord { record_type: "adso_detail".to_string(), fields: Default::default() });
        let mut rsds = HashMap::new();
        rsds.insert(
            "/sap/bw/modeling/rsds/PRODSYS/0CUSTOMER".to_string(),
            DetailRecord { record_type: "rsds_detail".to_string(), fields: Default::default() },
        );
        let mut dtp = HashMap::new();
        dtp.insert(
            "/x/dtp".to_string(),
            TrfnDetail {
                source: ObjectRefLite { object_type: "DSO".to_string(), name: "ZSRC".to_string(), uri: None },
                target: ObjectRefLite { object_type: "ADSO".to_string(), name: "ZTGT".to_string(), uri: None },
                rules: vec![erpl_xml::bw::transformation::TrfnRule {
                    rule_type: "MOVE".to_string(),
                    source_fields: vec!["CUSTOMER".to_string()],
                    target_fields: vec!["CUST_ID".to_string()],
                    ..Default::default()
                }],
            },
        );

        let fetcher = DetailFetcher { nodes_by_container: Mutex::new(containers), adso, rsds, dtp };
        let result = export_infoarea(&fetcher, "ZAREA", ExportOptions::default()).await;

        let adso_obj = result.objects.iter().find(|o| o.name == "ZADSO").unwrap();
        assert!(matches!(adso_obj.detail, Some(ObjectDetail::Adso(_))));

        let rsds_obj = result.objects.iter().find(|o| o.name == "0CUSTOMER").unwrap();
        match &rsds_obj.detail {
            Some(ObjectDetail::Rsds { source_system, .. }) => assert_eq!(source_system, "PRODSYS"),
            other => panic!("expected Rsds detail, got {other:?}"),
        }

        let dtp_obj = result.objects.iter().find(|o| o.name == "ZDTP").unwrap();
        assert!(matches!(dtp_obj.detail, Some(ObjectDetail::Dataflow(_))));
        let src_id = crate::model::component_node_id("DSO", "ZSRC");
        let tgt_id = crate::model::component_node_id("ADSO", "ZTGT");
        assert!(result.graph.edges.iter().any(|e| e.from == src_id && e.to == tgt_id));
    }
}
