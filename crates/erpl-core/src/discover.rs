// SPDX-License-Identifier: MIT OR Apache-2.0
//! Discovery: capability probe over `GET /sap/bc/adt/discovery` (§6.1, §6.2 `adt_discover`).

use erpl_error::Error;
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use serde_json::json;

/// Fetch the discovery document and summarize capability flags.
pub async fn discover(session: &AdtSession) -> Result<serde_json::Value, Error> {
    let response = session.get("/sap/bc/adt/discovery", &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status(
            "Discover",
            "/sap/bc/adt/discovery",
            response.status_code,
            response.body,
            erpl_error::ErrorKind::Internal,
        ));
    }
    let discovery = erpl_xml::parse_discovery(&response.body)?;
    Ok(json!({
        "abapgit_present": discovery.abapgit_present,
        "packages_present": discovery.packages_present,
        "activation_present": discovery.activation_present,
        "collections": discovery.collections.iter().map(|c| json!({
            "href": c.href,
            "title": c.title,
        })).collect::<Vec<_>>(),
    }))
}
