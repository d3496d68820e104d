// SPDX-License-Identifier: MIT OR Apache-2.0
//! ADT repository search (§6.1, §6.2 `adt_search`).

use erpl_error::{Error, ErrorKind};
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use erpl_xml::bw::misc::build_query_string;
use serde_json::json;

/// `GET /sap/bc/adt/repository/informationsystem/search?query=...`
pub async fn search(session: &AdtSession, query: &str) -> Result<serde_json::Value, Error> {
    let qs = build_query_string(&[("query", query), ("maxResults", "100")]);
    let path = format!("/sap/bc/adt/repository/informationsystem/search?{qs}");
    let response = session.get(&path, &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("Search", path, response.status_code, response.body, ErrorKind::Internal));
    }
    let results = erpl_xml::parse_object_references(&response.body)?;
    Ok(json!({
        "query": query,
        "results": results.iter().map(|r| json!({
            "object_type": r.object_type,
            "name": r.name,
            "uri": r.uri,
        })).collect::<Vec<_>>(),
    }))
}
