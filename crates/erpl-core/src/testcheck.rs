// SPDX-License-Identifier: MIT OR Apache-2.0
//! ABAP Unit test runs and ATC check runs (§6.1, §6.2 `adt_run_tests`/`adt_run_atc`).

use erpl_error::{Error, ErrorKind};
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use erpl_xml::bw::misc::build_query_string;
use serde_json::json;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn run_request_xml(root_tag: &str, uri: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><{root_tag} xmlns:adtcore="http://www.sap.com/adt/core"><adtcore:objectSets><adtcore:objectSet kind="inclusive"><adtcore:objectTypeScope><adtcore:objectType>CLAS</adtcore:objectType></adtcore:objectTypeScope><adtcore:objectReferences><adtcore:objectReference adtcore:uri="{uri}"/></adtcore:objectReferences></adtcore:objectSet></adtcore:objectSets></{root_tag}>"#,
        uri = escape(uri),
    )
}

/// `POST /sap/bc/adt/abapunit/testruns`. Counts `alert` elements whose
/// severity is `critical` or `error` as failures (§6.2 `adt_run_tests`).
pub async fn run_tests(session: &AdtSession, uri: &str) -> Result<serde_json::Value, Error> {
    let path = "/sap/bc/adt/abapunit/testruns";
    let body = run_request_xml("aunit:runConfiguration", uri);
    let response = session.post(path, Some(&body), Some("application/vnd.sap.adt.abapunit.testruns.config.v5+xml"), &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("RunTests", path, response.status_code, response.body, ErrorKind::TestFailure));
    }
    let tree = erpl_xml::parse_xml_tree(&response.body).map_err(|e| e.into_error("RunTests", path, ErrorKind::Internal))?;
    let mut alerts = Vec::new();
    tree.find_all_descendants("alert", &mut alerts);
    let mut failed = 0usize;
    let mut details = Vec::new();
    for alert in &alerts {
        let fields = erpl_xml::harvest_fields(alert);
        let severity = fields.get("severity").cloned().unwrap_or_default();
        if severity == "critical" || severity == "error" {
            failed += 1;
        }
        details.push(json!({ "severity": severity, "title": fields.get("title").cloned().unwrap_or_default() }));
    }
    Ok(json!({
        "uri": uri,
        "total_alerts": alerts.len(),
        "failed": failed,
        "passed": failed == 0,
        "alerts": details,
    }))
}

/// `POST /sap/bc/adt/checkruns?reporters=abapCheckRun` (ATC). Counts `finding`
/// elements with priority `1` or `2` as errors (§6.2 `adt_run_atc`).
pub async fn run_atc(session: &AdtSession, uri: &str, check_variant: Option<&str>) -> Result<serde_json::Value, Error> {
    let qs = build_query_string(&[("reporters", "abapCheckRun")]);
    let path = format!("/sap/bc/adt/checkruns?{qs}");
    let variant = check_variant.unwrap_or("DEFAULT");
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><chkrun:checkObjectList xmlns:chkrun="http://www.sap.com/adt/checkrun" xmlns:adtcore="http://www.sap.com/adt/core"><chkrun:checkObject adtcore:uri="{uri}"><chkrun:checkVariant>{variant}</chkrun:checkVariant></chkrun:checkObject></chkrun:checkObjectList>"#,
        uri = escape(uri),
        variant = escape(variant),
    );
    let response = session.post(&path, Some(&body), Some("application/vnd.sap.adt.checkmessages+xml"), &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("RunAtc", path, response.status_code, response.body, ErrorKind::CheckError));
    }
    let tree = erpl_xml::parse_xml_tree(&response.body).map_err(|e| e.into_error("RunAtc", &path, ErrorKind::Internal))?;
    let mut findings = Vec::new();
    tree.find_all_descendants("finding", &mut findings);
    let mut errors = 0usize;
    let mut details = Vec::new();
    for finding in &findings {
        let fields = erpl_xml::harvest_fields(finding);
        let priority = fields.get("priority").cloned().unwrap_or_default();
        if priority == "1" || priority == "2" {
            errors += 1;
        }
        details.push(json!({ "priority": priority, "messageTitle": fields.get("messageTitle").cloned().unwrap_or_default() }));
    }
    Ok(json!({
        "uri": uri,
        "check_variant": variant,
        "total_findings": findings.len(),
        "errors": errors,
        "findings": details,
    }))
}
