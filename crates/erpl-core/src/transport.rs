// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transport management (§6.1 "transport management operation", §6.2
//! `adt_list_transports`/`adt_create_transport`/`adt_release_transport`).

use erpl_error::{Error, ErrorKind};
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use erpl_xml::bw::misc::build_query_string;
use serde_json::json;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// `GET /sap/bc/adt/cts/transportrequests?user=...` (§6.2 `adt_list_transports`).
pub async fn list_transports(session: &AdtSession, user: Option<&str>) -> Result<serde_json::Value, Error> {
    let mut pairs = Vec::new();
    if let Some(u) = user {
        pairs.push(("user", u));
    }
    let path = if pairs.is_empty() {
        "/sap/bc/adt/cts/transportrequests".to_string()
    } else {
        format!("/sap/bc/adt/cts/transportrequests?{}", build_query_string(&pairs))
    };
    let response = session.get(&path, &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("ListTransports", path, response.status_code, response.body, ErrorKind::TransportError));
    }
    let tree = erpl_xml::parse_xml_tree(&response.body).map_err(|e| e.into_error("ListTransports", &path, ErrorKind::Internal))?;
    let mut elements = Vec::new();
    tree.find_all_descendants("request", &mut elements);
    let transports: Vec<_> = elements
        .iter()
        .map(|el| {
            let fields = erpl_xml::harvest_fields(el);
            json!({
                "number": fields.get("number").cloned().unwrap_or_default(),
                "description": fields.get("desc").or_else(|| fields.get("description")).cloned().unwrap_or_default(),
                "owner": fields.get("owner").cloned().unwrap_or_default(),
                "status": fields.get("status").cloned().unwrap_or_default(),
            })
        })
        .collect();
    Ok(json!({ "user": user, "transports": transports }))
}

/// `POST /sap/bc/adt/cts/transportrequests` (§6.2 `adt_create_transport`).
pub async fn create_transport(session: &AdtSession, description: &str, target_package: &str) -> Result<serde_json::Value, Error> {
    let path = "/sap/bc/adt/cts/transportrequests";
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><tm:root xmlns:tm="http://www.sap.com/cts/adt/tm"><tm:request tm:desc="{description}" tm:targetpackage="{target_package}"/></tm:root>"#,
        description = escape(description),
        target_package = escape(target_package),
    );
    let response = session.post(path, Some(&body), Some("application/vnd.sap.as+xml;charset=UTF-8;dataname=com.sap.adt.CreateCorrectionRequest"), &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("CreateTransport", path, response.status_code, response.body, ErrorKind::TransportError));
    }
    let tree = erpl_xml::parse_xml_tree(&response.body).map_err(|e| e.into_error("CreateTransport", path, ErrorKind::Internal))?;
    let fields = erpl_xml::harvest_fields(&tree);
    let number = fields.get("number").cloned().unwrap_or_default();
    Ok(json!({ "number": number, "description": description, "target_package": target_package }))
}

/// `POST /sap/bc/adt/cts/transportrequests/<number>/newreleasejobs` (§6.2 `adt_release_transport`).
pub async fn release_transport(session: &AdtSession, transport_number: &str) -> Result<serde_json::Value, Error> {
    let path = format!("/sap/bc/adt/cts/transportrequests/{transport_number}/newreleasejobs");
    let response = session.post(&path, None, None, &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("ReleaseTransport", path, response.status_code, response.body, ErrorKind::TransportError));
    }
    Ok(json!({ "number": transport_number, "released": true }))
}
