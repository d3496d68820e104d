// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object read/write/lock/create/delete operations (§6.1, §6.2).

use erpl_error::{Error, ErrorKind};
use erpl_lock::LockGuard;
use erpl_session::AdtSession;
use erpl_types::CiHeaders;
use erpl_xml::bw::misc::build_query_string;
use serde_json::json;

/// `GET <uri>`: object metadata (ADT main detail document).
pub async fn read_object(session: &AdtSession, uri: &str) -> Result<serde_json::Value, Error> {
    let response = session.get(uri, &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("ReadObject", uri, response.status_code, response.body, ErrorKind::NotFound));
    }
    let tree = erpl_xml::parse_xml_tree(&response.body).map_err(|e| e.into_error("ReadObject", uri, ErrorKind::Internal))?;
    let fields = erpl_xml::harvest_fields(&tree);
    Ok(json!({ "uri": uri, "fields": fields }))
}

/// `GET <uri>/source/main?version=active|inactive`.
pub async fn read_source(session: &AdtSession, uri: &str, version: Option<&str>) -> Result<serde_json::Value, Error> {
    let version = version.unwrap_or("active");
    let path = format!("{uri}/source/main?{}", build_query_string(&[("version", version)]));
    let response = session.get(&path, &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("ReadSource", path, response.status_code, response.body, ErrorKind::NotFound));
    }
    Ok(json!({ "uri": uri, "version": version, "source": response.body }))
}

/// `POST <uri>?_action=LOCK&accessMode=MODIFY` (§6.2 `adt_lock`). When
/// `session_file` is given, the session is marked stateful and saved
/// (CSRF + cookies + context id + stateful=true) so a later, separate
/// `unlock` invocation with `--lock-handle` can complete the flow (§4.4
/// persistent handoff).
pub async fn lock(session: &AdtSession, uri: &str, session_file: Option<&str>) -> Result<serde_json::Value, Error> {
    if session_file.is_some() {
        session.set_stateful(true).await;
    }
    let result = match erpl_lock::lock_object(session, uri).await {
        Ok(result) => result,
        Err(e) => {
            if session_file.is_some() {
                session.set_stateful(false).await;
            }
            return Err(e);
        }
    };
    if let Some(path) = session_file {
        session.save_session(std::path::Path::new(path)).await?;
    }
    Ok(json!({
        "lock_handle": result.lock_handle,
        "corrnr": result.corrnr,
        "corruser": result.corruser,
        "corrtext": result.corrtext,
    }))
}

/// `POST <uri>?_action=UNLOCK&lockHandle=<h>` (§6.2 `adt_unlock`). When
/// `session_file` is given, the saved session is loaded first so the
/// unlock carries the CSRF token/cookies/context id the lock invocation
/// captured; the file is deleted once the unlock succeeds (§4.4).
pub async fn unlock(session: &AdtSession, uri: &str, lock_handle: &str, session_file: Option<&str>) -> Result<serde_json::Value, Error> {
    if let Some(path) = session_file {
        session.load_session(std::path::Path::new(path)).await?;
    }
    erpl_lock::unlock_object(session, uri, lock_handle).await?;
    if let Some(path) = session_file {
        session.set_stateful(false).await;
        std::fs::remove_file(path).map_err(|e| Error::new("UnlockObject", path, e.to_string(), ErrorKind::Internal))?;
    }
    Ok(json!({ "uri": uri, "unlocked": true }))
}

/// `PUT <uri>/source/main`. Acquires and releases its own lock when
/// `lock_handle` is absent (§4.4, §6.2 `adt_write_source`).
pub async fn write_source(
    session: &AdtSession,
    uri: &str,
    source: &str,
    lock_handle: Option<&str>,
    transport: Option<&str>,
) -> Result<serde_json::Value, Error> {
    let source_uri = format!("{uri}/source/main");
    let object_uri = erpl_lock::write_source_with_auto_lock(session, &source_uri, source, lock_handle, transport).await?;
    Ok(json!({ "uri": object_uri, "written": true }))
}

/// Known ADT object-type category roots for `POST` object creation.
/// Unmapped categories fail with a descriptive hint rather than guessing
/// a URL (§9: open question, listed in the design ledger).
fn create_collection_path(object_type: &str) -> Option<&'static str> {
    match object_type.split('/').next().unwrap_or_default() {
        "CLAS" => Some("/sap/bc/adt/oo/classes"),
        "INTF" => Some("/sap/bc/adt/oo/interfaces"),
        "PROG" => Some("/sap/bc/adt/programs/programs"),
        "FUGR" => Some("/sap/bc/adt/functions/groups"),
        "DEVC" => Some("/sap/bc/adt/packages"),
        "DDLS" => Some("/sap/bc/adt/ddic/ddl/sources"),
        _ => None,
    }
}

/// `POST` a new object into its type-specific collection (§6.2 `adt_create_object`).
pub async fn create_object(
    session: &AdtSession,
    object_type: &str,
    name: &str,
    package_name: &str,
    description: Option<&str>,
    transport: Option<&str>,
) -> Result<serde_json::Value, Error> {
    let Some(collection) = create_collection_path(object_type) else {
        return Err(Error::new(
            "CreateObject",
            object_type,
            format!("no known ADT collection endpoint for object type {object_type}"),
            ErrorKind::Internal,
        )
        .with_hint("supported categories: CLAS, INTF, PROG, FUGR, DEVC, DDLS"));
    };
    let body = if object_type.split('/').next() == Some("DEVC") {
        erpl_xml::build_package_create_xml(name, description.unwrap_or_default(), Some(package_name))
    } else {
        build_generic_create_xml(object_type, name, package_name, description.unwrap_or_default())
    };
    let mut query_pairs = Vec::new();
    if let Some(t) = transport {
        query_pairs.push(("corrNr", t));
    }
    let path = if query_pairs.is_empty() { collection.to_string() } else { format!("{collection}?{}", build_query_string(&query_pairs)) };
    let response = session.post(&path, Some(&body), Some("application/vnd.sap.adt.core+xml"), &CiHeaders::new()).await?;
    if !response.is_success() {
        return Err(Error::from_http_status("CreateObject", path, response.status_code, response.body, ErrorKind::PackageError));
    }
    Ok(json!({ "object_type": object_type, "name": name, "package_name": package_name, "created": true }))
}

fn build_generic_create_xml(object_type: &str, name: &str, package_name: &str, description: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><adtcore:object xmlns:adtcore="http://www.sap.com/adt/core" adtcore:type="{object_type}" adtcore:name="{name}" adtcore:description="{description}" adtcore:packageName="{package_name}"/>"#
    )
}

/// `DELETE <uri>`, acquiring its own lock when `lock_handle` is absent (§6.2 `adt_delete_object`).
pub async fn delete_object(session: &AdtSession, uri: &str, lock_handle: Option<&str>, transport: Option<&str>) -> Result<serde_json::Value, Error> {
    match lock_handle {
        Some(handle) => delete_with_handle(session, uri, handle, transport).await,
        None => {
            let guard = LockGuard::acquire(session, uri).await?;
            let handle = guard.lock_handle().to_string();
            let result = delete_with_handle(session, uri, &handle, transport).await;
            guard.release().await?;
            result
        }
    }
}

async fn delete_with_handle(session: &AdtSession, uri: &str, handle: &str, transport: Option<&str>) -> Result<serde_json::Value, Error> {
    let mut query_pairs = vec![("lockHandle", handle)];
    if let Some(t) = transport {
        query_pairs.push(("corrNr", t));
    }
    let path = format!("{uri}?{}", build_query_string(&query_pairs));
    let response = session.delete(&path, &CiHeaders::new()).await?;
    if !response.is_success() && response.status_code != 204 {
        return Err(Error::from_http_status("DeleteObject", path, response.status_code, response.body, ErrorKind::Internal));
    }
    Ok(json!({ "uri": uri, "deleted": true }))
}
