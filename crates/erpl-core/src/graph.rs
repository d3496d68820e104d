// SPDX-License-Identifier: MIT OR Apache-2.0
//! BW graph export/assembly operations (§4.5), wiring `erpl-graph`'s
//! fetcher traits to a live `AdtSession`.

use async_trait::async_trait;
use erpl_error::{Error, ErrorKind};
use erpl_graph::export::{BwFetcher, ExportOptions};
use erpl_graph::query_graph::QueryComponentFetcher;
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use erpl_xml::bw::nodes::{parse_bw_nodes, BwNode};
use erpl_xml::bw::query::{parse_query_detail, QueryDetail};
use erpl_xml::bw::transformation::{parse_transformation, TrfnDetail};
use erpl_xml::bw::ObjectRefLite;
use erpl_xml::bw::misc::build_query_string;
use erpl_xml::DetailRecord;
use serde_json::json;

const ACTIVE_VERSION: &str = "a";

fn generic_detail(operation: &'static str, record_type: &str, xml: &str, endpoint: &str) -> Result<DetailRecord, Error> {
    let tree = erpl_xml::parse_xml_tree(xml).map_err(|e| e.into_error(operation, endpoint, ErrorKind::Internal))?;
    Ok(DetailRecord::from_tree(record_type, &tree))
}

/// `BwFetcher` backed by a live ADT session, used by the real infoarea
/// export (as opposed to the queue-backed fakes `erpl-graph`'s own tests
/// inject).
struct SessionBwFetcher<'a> {
    session: &'a AdtSession,
}

#[async_trait]
impl BwFetcher for SessionBwFetcher<'_> {
    async fn get_nodes(&self, container_uri: &str, _container_name: &str) -> Result<Vec<BwNode>, Error> {
        let response = self.session.get(container_uri, &CiHeaders::new()).await?;
        if !response.is_success() {
            return Err(Error::from_http_status("GetNodes", container_uri, response.status_code, response.body, ErrorKind::Internal));
        }
        parse_bw_nodes(&response.body, container_uri)
    }

    async fn get_transformation(&self, object_uri: &str) -> Result<Option<TrfnDetail>, Error> {
        let response = self.session.get(object_uri, &CiHeaders::new()).await?;
        if response.status_code == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(Error::from_http_status("GetTransformation", object_uri, response.status_code, response.body, ErrorKind::Internal));
        }
        Ok(Some(parse_transformation(&response.body, object_uri)?))
    }

    async fn get_adso_detail(&self, object_uri: &str) -> Result<Option<DetailRecord>, Error> {
        let response = self.session.get(object_uri, &CiHeaders::new()).await?;
        if response.status_code == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(Error::from_http_status("GetAdsoDetail", object_uri, response.status_code, response.body, ErrorKind::Internal));
        }
        Ok(Some(generic_detail("GetAdsoDetail", "adso_detail", &response.body, object_uri)?))
    }

    async fn get_rsds_detail(&self, object_uri: &str, _source_system: &str) -> Result<Option<DetailRecord>, Error> {
        let response = self.session.get(object_uri, &CiHeaders::new()).await?;
        if response.status_code == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(Error::from_http_status("GetRsdsDetail", object_uri, response.status_code, response.body, ErrorKind::Internal));
        }
        Ok(Some(generic_detail("GetRsdsDetail", "rsds_detail", &response.body, object_uri)?))
    }

    async fn get_dtp_detail(&self, object_uri: &str) -> Result<Option<TrfnDetail>, Error> {
        let response = self.session.get(object_uri, &CiHeaders::new()).await?;
        if response.status_code == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(Error::from_http_status("GetDtpDetail", object_uri, response.status_code, response.body, ErrorKind::Internal));
        }
        Ok(Some(parse_transformation(&response.body, object_uri)?))
    }

    async fn search(&self, infoarea: &str) -> Result<Vec<BwNode>, Error> {
        let qs = build_query_string(&[("query", infoarea)]);
        let path = format!("/sap/bw/modeling/repo/is/bwsearch?{qs}");
        let response = self.session.get(&path, &CiHeaders::new()).await?;
        if !response.is_success() {
            return Err(Error::from_http_status("Search", &path, response.status_code, response.body, ErrorKind::Internal));
        }
        parse_bw_nodes(&response.body, &path)
    }

    async fn xref(&self, provider_uri: &str) -> Result<Vec<ObjectRefLite>, Error> {
        let path = format!("{provider_uri}/xref");
        let response = self.session.get(&path, &CiHeaders::new()).await?;
        if !response.is_success() {
            return Err(Error::from_http_status("Xref", &path, response.status_code, response.body, ErrorKind::Internal));
        }
        let nodes = parse_bw_nodes(&response.body, &path)?;
        Ok(nodes
            .into_iter()
            .map(|n| ObjectRefLite { object_type: n.object_type, name: n.object_name, uri: n.uri })
            .collect())
    }

    async fn get_query_component(&self, elem_uri: &str) -> Result<Option<QueryDetail>, Error> {
        let response = self.session.get_bw_component(elem_uri, "elem").await?;
        if response.status_code == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(Error::from_http_status("GetQueryComponent", elem_uri, response.status_code, response.body, ErrorKind::Internal));
        }
        Ok(Some(parse_query_detail(&response.body, elem_uri)?))
    }
}

/// `QueryComponentFetcher` backed by a live ADT session, used by single-
/// query graph assembly.
struct SessionQueryComponentFetcher<'a> {
    session: &'a AdtSession,
}

#[async_trait]
impl QueryComponentFetcher for SessionQueryComponentFetcher<'_> {
    async fn fetch_component(&self, component_type: &str, name: &str) -> Result<QueryDetail, Error> {
        let path = format!("/sap/bw/modeling/{}/{name}/{ACTIVE_VERSION}", component_type.to_ascii_lowercase());
        let response = self.session.get_bw_component(&path, component_type).await?;
        if !response.is_success() {
            return Err(Error::from_http_status("GetQueryComponent", &path, response.status_code, response.body, ErrorKind::Internal));
        }
        parse_query_detail(&response.body, &path)
    }
}

/// Options accepted by the `graph export` command/tool (§4.5).
#[derive(Debug, Clone, Default)]
pub struct GraphExportRequest {
    pub max_depth: Option<usize>,
    pub types_filter: Option<Vec<String>>,
    pub include_search_supplement: bool,
    pub include_xref_edges: bool,
    pub include_elem_provider_edges: bool,
    pub mermaid: bool,
}

/// Walk `infoarea_name` and emit an OpenMetadata-style catalog document
/// (optionally with an embedded Mermaid diagram), per §4.5 steps 1-10.
pub async fn export_infoarea(session: &AdtSession, infoarea_name: &str, request: GraphExportRequest) -> Result<serde_json::Value, Error> {
    let fetcher = SessionBwFetcher { session };
    let defaults = ExportOptions::default();
    let options = ExportOptions {
        max_depth: request.max_depth.unwrap_or(defaults.max_depth),
        types_filter: request.types_filter,
        include_search_supplement: request.include_search_supplement,
        include_xref_edges: request.include_xref_edges,
        include_elem_provider_edges: request.include_elem_provider_edges,
    };

    let result = erpl_graph::export::export_infoarea(&fetcher, infoarea_name, options).await;
    let mut catalog = erpl_graph::catalog::render_catalog(infoarea_name, &result.objects, &result.graph);
    if request.mermaid {
        catalog["mermaid"] = json!(erpl_graph::mermaid::render_infoarea_mermaid(infoarea_name, &result.objects, &result.graph, true));
    }
    Ok(catalog)
}

/// Assemble the single-query-focus graph rooted at `(root_type, root_name)`
/// and return it as JSON (§4.5).
pub async fn export_query_graph(session: &AdtSession, root_type: &str, root_name: &str) -> Result<serde_json::Value, Error> {
    let fetcher = SessionQueryComponentFetcher { session };
    let graph = erpl_graph::query_graph::assemble_query_graph(&fetcher, root_type, root_name).await;
    Ok(serde_json::to_value(&graph).unwrap_or(serde_json::Value::Null))
}
