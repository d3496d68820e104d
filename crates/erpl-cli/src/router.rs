// SPDX-License-Identifier: MIT OR Apache-2.0
//! New-style command router: a `(group, action) -> CommandInfo` table with
//! a per-group default action, dispatching to the same `erpl-core`
//! functions the MCP tool registry calls (§4.6).

use std::future::Future;
use std::pin::Pin;

use erpl_error::{Error, ErrorKind};
use erpl_session::AdtSession;
use serde_json::Value;

use crate::args::Args;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, Error>> + Send + 'a>>;
pub type Handler = for<'a> fn(&'a AdtSession, &'a Args) -> HandlerFuture<'a>;

pub struct CommandInfo {
    pub action: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: Handler,
}

pub struct Group {
    pub name: &'static str,
    pub description: &'static str,
    pub default_action: Option<&'static str>,
    pub commands: &'static [CommandInfo],
}

/// The closed set of new-style group names (§4.6 dispatch step 5).
pub const GROUP_NAMES: &[&str] = &["search", "object", "source", "test", "check", "transport", "ddic", "package", "discover", "graph"];

fn required(args: &Args, index: usize, name: &'static str) -> Result<String, Error> {
    args.positional(index)
        .map(str::to_string)
        .ok_or_else(|| Error::new("ParseArgs", "", format!("missing required argument: {name}"), ErrorKind::Internal))
}

fn required_flag(args: &Args, name: &'static str) -> Result<String, Error> {
    args.flag(name)
        .map(str::to_string)
        .ok_or_else(|| Error::new("ParseArgs", "", format!("missing required flag: --{name}"), ErrorKind::Internal))
}

fn h_search<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let query = required(args, 0, "query")?;
        erpl_core::search(session, &query).await
    })
}

fn h_object_read<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        erpl_core::read_object(session, &uri).await
    })
}

fn h_object_create<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let object_type = required(args, 0, "object_type")?;
        let name = required(args, 1, "name")?;
        let package = required_flag(args, "package")?;
        erpl_core::create_object(session, &object_type, &name, &package, args.flag("description"), args.flag("transport")).await
    })
}

fn h_object_delete<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        erpl_core::delete_object(session, &uri, args.flag("lock-handle"), args.flag("transport")).await
    })
}

fn h_object_lock<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        erpl_core::lock(session, &uri, args.flag("session-file")).await
    })
}

fn h_object_unlock<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        let lock_handle = required_flag(args, "lock-handle")?;
        erpl_core::unlock(session, &uri, &lock_handle, args.flag("session-file")).await
    })
}

fn h_source_read<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        erpl_core::read_source(session, &uri, args.flag("version")).await
    })
}

fn h_source_write<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        let source = match (args.flag("source"), args.flag("source-file")) {
            (Some(text), _) => text.to_string(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map_err(|e| Error::new("WriteSource", path, e.to_string(), ErrorKind::Internal))?,
            (None, None) => return Err(Error::new("ParseArgs", "", "pass --source or --source-file", ErrorKind::Internal)),
        };
        erpl_core::write_source(session, &uri, &source, args.flag("lock-handle"), args.flag("transport")).await
    })
}

fn h_test_run<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        erpl_core::run_tests(session, &uri).await
    })
}

fn h_check_run<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        erpl_core::run_atc(session, &uri, args.flag("check-variant")).await
    })
}

fn h_check_syntax<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let uri = required(args, 0, "uri")?;
        erpl_core::run_atc(session, &uri, Some("SYNTAX_CHECK")).await
    })
}

fn h_transport_list<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move { erpl_core::list_transports(session, args.flag("user")).await })
}

fn h_transport_create<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let description = required(args, 0, "description")?;
        let target_package = required(args, 1, "target_package")?;
        erpl_core::create_transport(session, &description, &target_package).await
    })
}

fn h_transport_release<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let transport_number = required(args, 0, "transport_number")?;
        erpl_core::release_transport(session, &transport_number).await
    })
}

fn h_ddic_table<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let table_name = required(args, 0, "table_name")?;
        erpl_core::read_table(session, &table_name).await
    })
}

fn h_ddic_cds<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let cds_name = required(args, 0, "cds_name")?;
        erpl_core::read_cds(session, &cds_name).await
    })
}

fn h_package_list<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let name = required(args, 0, "package_name")?;
        erpl_core::list_package(session, &name).await
    })
}

fn h_package_tree<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let root = required(args, 0, "root_package")?;
        erpl_core::package_tree(session, &root, args.flag("type-filter"), args.flag_u32("max-depth")).await
    })
}

fn h_package_exists<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let name = required(args, 0, "package_name")?;
        erpl_core::package_exists(session, &name).await
    })
}

fn h_discover<'a>(session: &'a AdtSession, _args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move { erpl_core::discover(session).await })
}

fn h_graph_export<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let infoarea = required(args, 0, "infoarea")?;
        let request = erpl_core::GraphExportRequest {
            max_depth: args.flag_u32("max-depth").map(|n| n as usize),
            types_filter: args.flag("types").map(|s| s.split(',').map(str::to_string).collect()),
            include_search_supplement: args.flag_bool("include-search-supplement"),
            include_xref_edges: args.flag_bool("include-xref-edges"),
            include_elem_provider_edges: args.flag_bool("include-elem-provider-edges"),
            mermaid: args.flag_bool("mermaid"),
        };
        erpl_core::export_infoarea(session, &infoarea, request).await
    })
}

fn h_graph_query<'a>(session: &'a AdtSession, args: &'a Args) -> HandlerFuture<'a> {
    Box::pin(async move {
        let root_type = required(args, 0, "root_type")?;
        let root_name = required(args, 1, "root_name")?;
        erpl_core::export_query_graph(session, &root_type, &root_name).await
    })
}

const SEARCH_COMMANDS: &[CommandInfo] = &[CommandInfo { action: "query", description: "full-text ADT repository search", usage: "search PATTERN", handler: h_search }];

const OBJECT_COMMANDS: &[CommandInfo] = &[
    CommandInfo { action: "read", description: "read an object's metadata", usage: "object read URI", handler: h_object_read },
    CommandInfo { action: "create", description: "create a new object", usage: "object create TYPE NAME --package PKG", handler: h_object_create },
    CommandInfo { action: "delete", description: "delete an object", usage: "object delete URI [--lock-handle H] [--transport T]", handler: h_object_delete },
    CommandInfo { action: "lock", description: "acquire a lock", usage: "object lock URI [--session-file FILE]", handler: h_object_lock },
    CommandInfo { action: "unlock", description: "release a lock", usage: "object unlock URI --lock-handle H [--session-file FILE]", handler: h_object_unlock },
];

const SOURCE_COMMANDS: &[CommandInfo] = &[
    CommandInfo { action: "read", description: "read an object's source", usage: "source read URI [--version active|inactive]", handler: h_source_read },
    CommandInfo { action: "write", description: "write an object's source", usage: "source write URI --source-file FILE [--lock-handle H] [--transport T]", handler: h_source_write },
];

const TEST_COMMANDS: &[CommandInfo] = &[CommandInfo { action: "run", description: "run ABAP Unit tests", usage: "test run URI", handler: h_test_run }];

const CHECK_COMMANDS: &[CommandInfo] = &[
    CommandInfo { action: "run", description: "run an ATC check variant", usage: "check run URI [--check-variant V]", handler: h_check_run },
    CommandInfo { action: "syntax", description: "run the syntax-only check variant", usage: "check syntax URI", handler: h_check_syntax },
];

const TRANSPORT_COMMANDS: &[CommandInfo] = &[
    CommandInfo { action: "list", description: "list transports", usage: "transport list [--user U]", handler: h_transport_list },
    CommandInfo { action: "create", description: "create a transport", usage: "transport create DESCRIPTION TARGET_PACKAGE", handler: h_transport_create },
    CommandInfo { action: "release", description: "release a transport", usage: "transport release NUMBER", handler: h_transport_release },
];

const DDIC_COMMANDS: &[CommandInfo] = &[
    CommandInfo { action: "table", description: "read a DDIC table definition", usage: "ddic table NAME", handler: h_ddic_table },
    CommandInfo { action: "cds", description: "read a CDS view definition", usage: "ddic cds NAME", handler: h_ddic_cds },
];

const PACKAGE_COMMANDS: &[CommandInfo] = &[
    CommandInfo { action: "list", description: "list a package's direct contents", usage: "package list NAME", handler: h_package_list },
    CommandInfo { action: "tree", description: "recursively list a package's contents", usage: "package tree ROOT [--type-filter T] [--max-depth N]", handler: h_package_tree },
    CommandInfo { action: "exists", description: "check whether a package exists", usage: "package exists NAME", handler: h_package_exists },
];

const DISCOVER_COMMANDS: &[CommandInfo] = &[CommandInfo { action: "run", description: "report server capabilities", usage: "discover", handler: h_discover }];

const GRAPH_COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        action: "export",
        description: "export an infoarea's BW lineage/query graph as a catalog document",
        usage: "graph export INFOAREA [--max-depth N] [--types T1,T2] [--include-search-supplement] [--include-xref-edges] [--include-elem-provider-edges] [--mermaid]",
        handler: h_graph_export,
    },
    CommandInfo { action: "query", description: "assemble a single query's component graph", usage: "graph query ROOT_TYPE ROOT_NAME", handler: h_graph_query },
];

pub const GROUPS: &[Group] = &[
    Group { name: "search", description: "full-text ADT search", default_action: Some("query"), commands: SEARCH_COMMANDS },
    Group { name: "object", description: "generic ADT object operations", default_action: Some("read"), commands: OBJECT_COMMANDS },
    Group { name: "source", description: "object source read/write", default_action: Some("read"), commands: SOURCE_COMMANDS },
    Group { name: "test", description: "ABAP Unit test runs", default_action: Some("run"), commands: TEST_COMMANDS },
    Group { name: "check", description: "ATC check runs", default_action: Some("run"), commands: CHECK_COMMANDS },
    Group { name: "transport", description: "transport management", default_action: Some("list"), commands: TRANSPORT_COMMANDS },
    Group { name: "ddic", description: "DDIC table/CDS reads", default_action: Some("table"), commands: DDIC_COMMANDS },
    Group { name: "package", description: "package listing and tree walks", default_action: Some("list"), commands: PACKAGE_COMMANDS },
    Group { name: "discover", description: "server capability discovery", default_action: Some("run"), commands: DISCOVER_COMMANDS },
    Group { name: "graph", description: "BW lineage/query graph export", default_action: Some("export"), commands: GRAPH_COMMANDS },
];

pub fn find_group(name: &str) -> Option<&'static Group> {
    GROUPS.iter().find(|g| g.name == name)
}

/// Resolve the action token and the command's own positional arguments
/// from the tokens following the group name, honoring the group's
/// default action when no second positional matches a known action
/// (§4.6).
pub fn resolve_action<'a>(group: &'static Group, rest_positionals: &'a [String]) -> Option<(&'static CommandInfo, &'a [String])> {
    if let Some(first) = rest_positionals.first() {
        if let Some(cmd) = group.commands.iter().find(|c| c.action == first) {
            return Some((cmd, &rest_positionals[1..]));
        }
    }
    let default = group.default_action?;
    let cmd = group.commands.iter().find(|c| c.action == default)?;
    Some((cmd, rest_positionals))
}
