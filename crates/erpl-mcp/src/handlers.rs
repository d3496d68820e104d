// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tool dispatch: extracts typed parameters from the JSON-RPC `arguments`
//! object and calls the same `erpl-core` functions the CLI router uses
//! (§4.6).

use erpl_session::AdtSession;
use serde_json::Value;

/// The result of one tool call (§4.6): `content` is always a single text
/// item carrying the JSON payload (success) or an error description.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolResult {
    pub is_error: bool,
    pub content: Vec<ContentItem>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ToolResult {
    fn ok(value: Value) -> Self {
        Self { is_error: false, content: vec![ContentItem { kind: "text", text: value.to_string() }] }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { is_error: true, content: vec![ContentItem { kind: "text", text: message.into() }] }
    }
}

fn require_str<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing or invalid required parameter: {name}"))
}

fn optional_str<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn optional_u32(params: &Value, name: &str) -> Option<u32> {
    params.get(name).and_then(Value::as_u64).map(|n| n as u32)
}

fn optional_bool(params: &Value, name: &str) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn optional_string_list(params: &Value, name: &str) -> Option<Vec<String>> {
    params.get(name)?.as_array().map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
}

/// Execute one named tool against `params`, the `arguments` object from a
/// `tools/call` request. Missing/invalid params short-circuit with
/// `is_error = true`, never panicking (§4.6).
pub async fn execute(session: &AdtSession, name: &str, params: &Value) -> ToolResult {
    let outcome = dispatch(session, name, params).await;
    match outcome {
        Ok(DispatchOutcome::Value(value)) => ToolResult::ok(value),
        Ok(DispatchOutcome::ParamError(message)) => ToolResult::error(message),
        Err(e) => ToolResult::error(e.to_json().to_string()),
    }
}

enum DispatchOutcome {
    Value(Value),
    ParamError(String),
}

macro_rules! require {
    ($params:expr, $name:expr) => {
        match require_str($params, $name) {
            Ok(v) => v,
            Err(e) => return Ok(DispatchOutcome::ParamError(e)),
        }
    };
}

async fn dispatch(session: &AdtSession, name: &str, params: &Value) -> Result<DispatchOutcome, erpl_error::Error> {
    let value = match name {
        "adt_search" => {
            let query = require!(params, "query");
            erpl_core::search(session, query).await?
        }
        "adt_read_object" => {
            let uri = require!(params, "uri");
            erpl_core::read_object(session, uri).await?
        }
        "adt_read_source" => {
            let uri = require!(params, "uri");
            erpl_core::read_source(session, uri, optional_str(params, "version")).await?
        }
        "adt_check_syntax" => {
            let uri = require!(params, "uri");
            erpl_core::run_atc(session, uri, Some("SYNTAX_CHECK")).await?
        }
        "adt_run_tests" => {
            let uri = require!(params, "uri");
            erpl_core::run_tests(session, uri).await?
        }
        "adt_run_atc" => {
            let uri = require!(params, "uri");
            erpl_core::run_atc(session, uri, optional_str(params, "check_variant")).await?
        }
        "adt_list_transports" => erpl_core::list_transports(session, optional_str(params, "user")).await?,
        "adt_read_table" => {
            let table_name = require!(params, "table_name");
            erpl_core::read_table(session, table_name).await?
        }
        "adt_read_cds" => {
            let cds_name = require!(params, "cds_name");
            erpl_core::read_cds(session, cds_name).await?
        }
        "adt_list_package" => {
            let package_name = require!(params, "package_name");
            erpl_core::list_package(session, package_name).await?
        }
        "adt_package_tree" => {
            let root_package = require!(params, "root_package");
            erpl_core::package_tree(session, root_package, optional_str(params, "type_filter"), optional_u32(params, "max_depth")).await?
        }
        "adt_package_exists" => {
            let package_name = require!(params, "package_name");
            erpl_core::package_exists(session, package_name).await?
        }
        "adt_discover" => erpl_core::discover(session).await?,
        "adt_lock" => {
            let uri = require!(params, "uri");
            erpl_core::lock(session, uri, None).await?
        }
        "adt_unlock" => {
            let uri = require!(params, "uri");
            let lock_handle = require!(params, "lock_handle");
            erpl_core::unlock(session, uri, lock_handle, None).await?
        }
        "adt_write_source" => {
            let uri = require!(params, "uri");
            let source = require!(params, "source");
            erpl_core::write_source(session, uri, source, optional_str(params, "lock_handle"), optional_str(params, "transport")).await?
        }
        "adt_create_object" => {
            let object_type = require!(params, "object_type");
            let obj_name = require!(params, "name");
            let package_name = require!(params, "package_name");
            erpl_core::create_object(session, object_type, obj_name, package_name, optional_str(params, "description"), optional_str(params, "transport")).await?
        }
        "adt_delete_object" => {
            let uri = require!(params, "uri");
            erpl_core::delete_object(session, uri, optional_str(params, "lock_handle"), optional_str(params, "transport")).await?
        }
        "adt_create_transport" => {
            let description = require!(params, "description");
            let target_package = require!(params, "target_package");
            erpl_core::create_transport(session, description, target_package).await?
        }
        "adt_release_transport" => {
            let transport_number = require!(params, "transport_number");
            erpl_core::release_transport(session, transport_number).await?
        }
        "adt_graph_export" => {
            let infoarea = require!(params, "infoarea");
            let request = erpl_core::GraphExportRequest {
                max_depth: optional_u32(params, "max_depth").map(|n| n as usize),
                types_filter: optional_string_list(params, "types"),
                include_search_supplement: optional_bool(params, "include_search_supplement"),
                include_xref_edges: optional_bool(params, "include_xref_edges"),
                include_elem_provider_edges: optional_bool(params, "include_elem_provider_edges"),
                mermaid: optional_bool(params, "mermaid"),
            };
            erpl_core::export_infoarea(session, infoarea, request).await?
        }
        other => return Ok(DispatchOutcome::ParamError(format!("unknown tool: {other}"))),
    };
    Ok(DispatchOutcome::Value(value))
}
