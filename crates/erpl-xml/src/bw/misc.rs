// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subsidiary BW detail parsers (§4.8): RSDS detail, system info, db info,
//! changeability, ADT-URI mappings, value help, virtual folders, data
//! volumes, reporting/query properties, application log, message text,
//! validation, move requests, search metadata, backend favorites, node
//! path, dataflow topology. All of these share one normalization rule:
//! harvest whatever fields the shape carries into a flat map and tag the
//! result with the endpoint that produced it, so callers get a uniform
//! `Result<BwDetail, Error>` regardless of which of the ~16 endpoints
//! answered.

use erpl_error::{Error, ErrorKind};

use crate::generic::harvest_fields;
use crate::tree::parse_xml_tree;
use crate::DetailRecord;

/// The subsidiary BW endpoint kinds enumerated in §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BwDetailKind {
    RsdsDetail,
    SystemInfo,
    DbInfo,
    Changeability,
    AdtUriMapping,
    ValueHelp,
    VirtualFolders,
    DataVolumes,
    ReportingProperties,
    QueryProperties,
    ApplicationLog,
    MessageText,
    Validation,
    MoveRequests,
    SearchMetadata,
    BackendFavorites,
    NodePath,
    DataflowTopology,
}

impl BwDetailKind {
    fn operation(self) -> &'static str {
        match self {
            BwDetailKind::RsdsDetail => "GetRsdsDetail",
            BwDetailKind::SystemInfo => "GetSystemInfo",
            BwDetailKind::DbInfo => "GetDbInfo",
            BwDetailKind::Changeability => "GetChangeability",
            BwDetailKind::AdtUriMapping => "GetAdtUriMapping",
            BwDetailKind::ValueHelp => "GetValueHelp",
            BwDetailKind::VirtualFolders => "GetVirtualFolders",
            BwDetailKind::DataVolumes => "GetDataVolumes",
            BwDetailKind::ReportingProperties => "GetReportingProperties",
            BwDetailKind::QueryProperties => "GetQueryProperties",
            BwDetailKind::ApplicationLog => "GetApplicationLog",
            BwDetailKind::MessageText => "GetMessageText",
            BwDetailKind::Validation => "GetValidation",
            BwDetailKind::MoveRequests => "GetMoveRequests",
            BwDetailKind::SearchMetadata => "GetSearchMetadata",
            BwDetailKind::BackendFavorites => "GetBackendFavorites",
            BwDetailKind::NodePath => "GetNodePath",
            BwDetailKind::DataflowTopology => "GetDataflowTopology",
        }
    }

    fn record_type(self) -> &'static str {
        match self {
            BwDetailKind::RsdsDetail => "rsds_detail",
            BwDetailKind::SystemInfo => "systeminfo",
            BwDetailKind::DbInfo => "dbinfo",
            BwDetailKind::Changeability => "chginfo",
            BwDetailKind::AdtUriMapping => "adturi",
            BwDetailKind::ValueHelp => "xref",
            BwDetailKind::VirtualFolders => "virtualfolders",
            BwDetailKind::DataVolumes => "datavolumes",
            BwDetailKind::ReportingProperties => "comp_reporting",
            BwDetailKind::QueryProperties => "rules_qprops",
            BwDetailKind::ApplicationLog => "applicationlog",
            BwDetailKind::MessageText => "message",
            BwDetailKind::Validation => "validation",
            BwDetailKind::MoveRequests => "move_requests",
            BwDetailKind::SearchMetadata => "bwsearch_metadata",
            BwDetailKind::BackendFavorites => "backendfavorites",
            BwDetailKind::NodePath => "nodepath",
            BwDetailKind::DataflowTopology => "dataflow_topology",
        }
    }
}

/// Parse one of the §4.8 subsidiary BW response bodies into a flat,
/// uniformly-shaped detail record.
pub fn parse_bw_detail(kind: BwDetailKind, xml: &str, endpoint: &str) -> Result<DetailRecord, Error> {
    let tree = parse_xml_tree(xml)
        .map_err(|e| e.into_error(kind.operation(), endpoint, ErrorKind::Internal))?;
    let fields = harvest_fields(&tree);
    Ok(DetailRecord { record_type: kind.record_type().to_string(), fields })
}

/// Percent-encode a single query parameter value per §4.8 ("never by
/// string-concatenating raw input"). Encodes everything outside the
/// unreserved RFC 3986 set.
pub fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(*byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Build a `key=value&...` query string from already-ordered pairs,
/// percent-encoding each value.
pub fn build_query_string(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
