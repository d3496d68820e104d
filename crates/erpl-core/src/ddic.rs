// SPDX-License-Identifier: MIT OR Apache-2.0
//! DDIC reads: table structure and CDS view source (§6.1, §6.2 `adt_read_table`/`adt_read_cds`).

use erpl_error::{Error, ErrorKind};
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use serde_json::json;

/// `GET /sap/bc/adt/ddic/tables/<NAME>`.
pub async fn read_table(session: &AdtSession, table_name: &str) -> Result<serde_json::Value, Error> {
    let path = format!("/sap/bc/adt/ddic/tables/{}", table_name.to_lowercase());
    let response = session.get(&path, &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("ReadTable", path, response.status_code, response.body, ErrorKind::NotFound));
    }
    let tree = erpl_xml::parse_xml_tree(&response.body).map_err(|e| e.into_error("ReadTable", &path, ErrorKind::Internal))?;
    let fields = erpl_xml::harvest_fields(&tree);
    Ok(json!({ "table_name": table_name, "fields": fields }))
}

/// `GET /sap/bc/adt/ddic/ddl/sources/<NAME>/source/main`.
pub async fn read_cds(session: &AdtSession, cds_name: &str) -> Result<serde_json::Value, Error> {
    let path = format!("/sap/bc/adt/ddic/ddl/sources/{}/source/main", cds_name.to_lowercase());
    let response = session.get(&path, &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("ReadCds", path, response.status_code, response.body, ErrorKind::NotFound));
    }
    Ok(json!({ "cds_name": cds_name, "source": response.body }))
}
