// SPDX-License-Identifier: MIT OR Apache-2.0
//! The fixed MCP tool registry (§4.6, §6.2): one [`ToolDefinition`] per
//! tool, carrying its JSON-schema parameter declaration.

use serde_json::{json, Value};

/// A single registered tool's static metadata.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn schema(required: &[&str], properties: Value) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

/// The registered tools (§6.2): the 13 read-only tools, then 7 mutating
/// tools, then the BW graph export tool.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "adt_search",
            description: "Search the ABAP repository for objects matching a pattern.",
            input_schema: schema(&["query"], json!({ "query": string_prop("Search pattern, e.g. ZCL*") })),
        },
        ToolDefinition {
            name: "adt_read_object",
            description: "Read an ADT object's metadata.",
            input_schema: schema(&["uri"], json!({ "uri": string_prop("ADT object URI") })),
        },
        ToolDefinition {
            name: "adt_read_source",
            description: "Read an ADT object's source code.",
            input_schema: schema(&["uri"], json!({
                "uri": string_prop("ADT object URI"),
                "version": string_prop("active or inactive (default active)"),
            })),
        },
        ToolDefinition {
            name: "adt_check_syntax",
            description: "Run an ATC syntax check against an object.",
            input_schema: schema(&["uri"], json!({ "uri": string_prop("ADT object URI") })),
        },
        ToolDefinition {
            name: "adt_run_tests",
            description: "Run ABAP Unit tests for an object.",
            input_schema: schema(&["uri"], json!({ "uri": string_prop("ADT object URI") })),
        },
        ToolDefinition {
            name: "adt_run_atc",
            description: "Run an ATC check variant against an object.",
            input_schema: schema(&["uri"], json!({
                "uri": string_prop("ADT object URI"),
                "check_variant": string_prop("ATC check variant (default DEFAULT)"),
            })),
        },
        ToolDefinition {
            name: "adt_list_transports",
            description: "List transport requests, optionally filtered by owning user.",
            input_schema: schema(&[], json!({ "user": string_prop("Owning user name filter") })),
        },
        ToolDefinition {
            name: "adt_read_table",
            description: "Read a DDIC table's structure.",
            input_schema: schema(&["table_name"], json!({ "table_name": string_prop("DDIC table name") })),
        },
        ToolDefinition {
            name: "adt_read_cds",
            description: "Read a CDS view's DDL source.",
            input_schema: schema(&["cds_name"], json!({ "cds_name": string_prop("CDS view name") })),
        },
        ToolDefinition {
            name: "adt_list_package",
            description: "List the direct contents of an ABAP package.",
            input_schema: schema(&["package_name"], json!({ "package_name": string_prop("ABAP package name") })),
        },
        ToolDefinition {
            name: "adt_package_tree",
            description: "Recursively walk a package and its sub-packages.",
            input_schema: schema(&["root_package"], json!({
                "root_package": string_prop("Root ABAP package name"),
                "type_filter": string_prop("Restrict results to one ADT object type"),
                "max_depth": json!({ "type": "integer", "description": "Maximum recursion depth (default 5)" }),
            })),
        },
        ToolDefinition {
            name: "adt_package_exists",
            description: "Check whether an ABAP package exists.",
            input_schema: schema(&["package_name"], json!({ "package_name": string_prop("ABAP package name") })),
        },
        ToolDefinition {
            name: "adt_discover",
            description: "Fetch the ADT discovery document and summarize capability flags.",
            input_schema: schema(&[], json!({})),
        },
        ToolDefinition {
            name: "adt_lock",
            description: "Acquire an edit lock on an object.",
            input_schema: schema(&["uri"], json!({ "uri": string_prop("ADT object URI") })),
        },
        ToolDefinition {
            name: "adt_unlock",
            description: "Release an edit lock on an object.",
            input_schema: schema(&["uri", "lock_handle"], json!({
                "uri": string_prop("ADT object URI"),
                "lock_handle": string_prop("Lock handle returned by adt_lock"),
            })),
        },
        ToolDefinition {
            name: "adt_write_source",
            description: "Write an object's source code, auto-locking if no lock_handle is given.",
            input_schema: schema(&["uri", "source"], json!({
                "uri": string_prop("ADT object URI"),
                "source": string_prop("New source code"),
                "lock_handle": string_prop("Existing lock handle (auto-locks if omitted)"),
                "transport": string_prop("Transport request number"),
            })),
        },
        ToolDefinition {
            name: "adt_create_object",
            description: "Create a new ADT object.",
            input_schema: schema(&["object_type", "name", "package_name"], json!({
                "object_type": string_prop("ADT object type, e.g. CLAS/OC"),
                "name": string_prop("New object's technical name"),
                "package_name": string_prop("Containing ABAP package"),
                "description": string_prop("Object description"),
                "transport": string_prop("Transport request number"),
            })),
        },
        ToolDefinition {
            name: "adt_delete_object",
            description: "Delete an ADT object, auto-locking if no lock_handle is given.",
            input_schema: schema(&["uri"], json!({
                "uri": string_prop("ADT object URI"),
                "lock_handle": string_prop("Existing lock handle (auto-locks if omitted)"),
                "transport": string_prop("Transport request number"),
            })),
        },
        ToolDefinition {
            name: "adt_create_transport",
            description: "Create a new transport request.",
            input_schema: schema(&["description", "target_package"], json!({
                "description": string_prop("Transport description"),
                "target_package": string_prop("Target ABAP package"),
            })),
        },
        ToolDefinition {
            name: "adt_release_transport",
            description: "Release a transport request.",
            input_schema: schema(&["transport_number"], json!({ "transport_number": string_prop("Transport request number") })),
        },
        ToolDefinition {
            name: "adt_graph_export",
            description: "Export a BW infoarea's lineage/query graph as an OpenMetadata-style catalog document.",
            input_schema: schema(&["infoarea"], json!({
                "infoarea": string_prop("BW infoarea technical name"),
                "max_depth": json!({ "type": "integer", "description": "Maximum BFS traversal depth (default 8)" }),
                "types": json!({ "type": "array", "items": { "type": "string" }, "description": "Restrict traversal to these object types" }),
                "include_search_supplement": json!({ "type": "boolean", "description": "Supplement with BW search results" }),
                "include_xref_edges": json!({ "type": "boolean", "description": "Include cross-reference edges" }),
                "include_elem_provider_edges": json!({ "type": "boolean", "description": "Include query-element-to-provider edges" }),
                "mermaid": json!({ "type": "boolean", "description": "Embed a Mermaid diagram in the response" }),
            })),
        },
    ]
}
