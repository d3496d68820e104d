// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lock response parsing (§4.2, §4.4). SAP returns a root-less fragment
//! (`asx:abap > asx:values > DATA` with no enclosing root, or just `DATA`
//! siblings) so the body must be wrapped in a synthetic root before parsing.

use erpl_error::{Error, ErrorKind};
use erpl_types::CiHeaders;

use crate::generic::harvest_fields;
use crate::tree::parse_xml_tree_wrapped;

/// Parsed result of a successful `LockObject` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockResult {
    /// The lock handle to use for subsequent write/unlock calls.
    pub lock_handle: String,
    /// Transport request number, if the object requires one.
    pub corrnr: Option<String>,
    /// Transport owning user.
    pub corruser: Option<String>,
    /// Transport description text.
    pub corrtext: Option<String>,
    /// `timestamp` lifted from the response headers.
    pub timestamp: Option<String>,
    /// `Development-Class` lifted from the response headers.
    pub development_class: Option<String>,
}

/// Parse a lock response body plus its headers into a [`LockResult`].
///
/// A missing `LOCK_HANDLE` is a `LockConflict`, per §4.2.
pub fn parse_lock_response(body: &str, headers: &CiHeaders, uri: &str) -> Result<LockResult, Error> {
    let tree = parse_xml_tree_wrapped(body)
        .map_err(|e| e.into_error("LockObject", uri, ErrorKind::LockConflict))?;

    // Navigate asx:abap > asx:values > DATA when present; otherwise treat
    // the (possibly synthetic) root itself as the DATA-bearing element.
    let data_el = tree
        .find_descendant("DATA")
        .unwrap_or(&tree);
    let fields = harvest_fields(data_el);

    let lock_handle = fields.get("LOCK_HANDLE").cloned().unwrap_or_default();
    if lock_handle.is_empty() {
        return Err(Error::new(
            "LockObject",
            uri,
            "empty or missing LOCK_HANDLE in lock response",
            ErrorKind::LockConflict,
        ));
    }

    Ok(LockResult {
        lock_handle,
        corrnr: fields.get("CORRNR").cloned().filter(|s| !s.is_empty()),
        corruser: fields.get("CORRUSER").cloned().filter(|s| !s.is_empty()),
        corrtext: fields.get("CORRTEXT").cloned().filter(|s| !s.is_empty()),
        timestamp: headers.get("timestamp").map(str::to_string),
        development_class: headers.get("Development-Class").map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lock_handle_is_lock_conflict() {
        let headers = CiHeaders::new();
        let err = parse_lock_response("<DATA><CORRNR></CORRNR></DATA>", &headers, "/x").unwrap_err();
        assert_eq!(err.kind, erpl_error::ErrorKind::LockConflict);
    }

    #[test]
    fn parses_rootless_asx_fragment() {
        let xml = r#"<asx:abap xmlns:asx="x"><asx:values><DATA><LOCK_HANDLE>lock_handle_abc123</LOCK_HANDLE><CORRNR>TR000123</CORRNR></DATA></asx:values></asx:abap>"#;
        let mut headers = CiHeaders::new();
        headers.set("timestamp", "20260101120000");
        let result = parse_lock_response(xml, &headers, "/sap/bc/adt/oo/classes/zcl_test").unwrap();
        assert_eq!(result.lock_handle, "lock_handle_abc123");
        assert_eq!(result.corrnr.as_deref(), Some("TR000123"));
        assert_eq!(result.timestamp.as_deref(), Some("20260101120000"));
    }

    #[test]
    fn parses_bare_sibling_fragment_without_asx_wrapper() {
        let xml = "<DATA><LOCK_HANDLE>h1</LOCK_HANDLE></DATA>";
        let headers = CiHeaders::new();
        let result = parse_lock_response(xml, &headers, "/x").unwrap();
        assert_eq!(result.lock_handle, "h1");
    }
}
