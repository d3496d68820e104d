// SPDX-License-Identifier: MIT OR Apache-2.0
//! `erpl-adt`: the CLI front end for the ADT/BW client. Dispatches to
//! `login`/`logout`, the MCP stdio server, a new-style
//! `search|object|source|test|check|transport|ddic|package|discover`
//! router, or the legacy deploy orchestrator (§4.6).

mod args;
mod credentials;
mod format;
mod legacy;
mod router;
mod session;

use std::io::Write;

use args::Args;
use erpl_error::Error;
use format::OutputFormat;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn top_level_help() -> String {
    let mut lines = vec![
        format!("erpl-adt {VERSION} - ABAP Development Tools / BW client"),
        String::new(),
        "USAGE:".to_string(),
        "    erpl-adt <COMMAND> [ARGS] [FLAGS]".to_string(),
        String::new(),
        "COMMANDS:".to_string(),
        "    login                    store connection credentials".to_string(),
        "    logout                   remove stored credentials".to_string(),
        "    mcp                      run the MCP tool server over stdio".to_string(),
    ];
    for group in router::GROUPS {
        lines.push(format!("    {:<24} {}", group.name, group.description));
    }
    lines.push("    deploy|status|pull|activate   legacy config-driven deploy orchestrator".to_string());
    lines.push(String::new());
    lines.push("GLOBAL FLAGS:".to_string());
    lines.push("    --host HOST  --port PORT  --client CLIENT  --user USER  --password PASSWORD".to_string());
    lines.push("    --password-env NAME  --https / --no-https  --json  --no-color  --verbose  --quiet".to_string());
    lines.join("\n")
}

fn group_help(group: &router::Group) -> String {
    let mut lines = vec![format!("{} - {}", group.name, group.description)];
    for cmd in group.commands {
        let marker = if Some(cmd.action) == group.default_action { " (default)" } else { "" };
        lines.push(format!("    {:<10} {}{}", cmd.action, cmd.description, marker));
        lines.push(format!("        usage: erpl-adt {}", cmd.usage));
    }
    lines.join("\n")
}

fn init_logging(args: &Args) {
    let filter = if let Ok(env_filter) = std::env::var("RUST_LOG") {
        EnvFilter::new(env_filter)
    } else if args.flag_bool("verbose") {
        EnvFilter::new("erpl=debug")
    } else if args.flag_bool("quiet") {
        EnvFilter::new("erpl=error")
    } else {
        EnvFilter::new("erpl=info")
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main]
async fn main() {
    let raw_tokens: Vec<String> = std::env::args().skip(1).collect();

    // Step 1: raw --version, checked before any other parsing.
    if raw_tokens.first().map(String::as_str) == Some("--version") {
        println!("erpl-adt {VERSION}");
        return;
    }
    // Step 2: raw --help/-h at top level.
    if matches!(raw_tokens.first().map(String::as_str), Some("--help") | Some("-h")) {
        println!("{}", top_level_help());
        return;
    }

    let args = Args::parse(&raw_tokens);
    init_logging(&args);

    if args.positionals.is_empty() {
        if args.flag_bool("help") {
            println!("{}", top_level_help());
            return;
        }
        eprintln!("{}", top_level_help());
        std::process::exit(99);
    }

    let command = args.positionals[0].clone();
    let rest: Vec<String> = args.positionals[1..].to_vec();
    let inner = Args { positionals: rest, flags: args.flags.clone() };

    let format = OutputFormat::from_flag(args.flag_bool("json"));
    let color = format::color_enabled(args.flag_bool("no-color"));

    let exit_code = match command.as_str() {
        // Step 3: login/logout.
        "login" => run_login(&inner),
        "logout" => run_logout(),
        // Step 4: mcp.
        "mcp" => run_mcp(&inner).await,
        // Step 5: new-style group dispatch.
        _ if router::GROUP_NAMES.contains(&command.as_str()) => run_group(&command, &inner, format, color).await,
        // Step 6: legacy deploy orchestrator (default fallback).
        _ if legacy::LEGACY_SUBCOMMANDS.contains(&command.as_str()) => run_legacy(&command, &inner, format, color).await,
        _ => run_legacy("deploy", &inner, format, color).await,
    };

    std::process::exit(exit_code);
}

fn run_login(args: &Args) -> i32 {
    use std::io::IsTerminal;
    let interactive = std::io::stdin().is_terminal() && args.flags.is_empty();
    let result = if interactive { login_interactive() } else { login_from_flags(args) };
    match result {
        Ok(()) => {
            println!("credentials saved to {}", credentials::default_path().display());
            0
        }
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    }
}

fn login_from_flags(args: &Args) -> Result<(), Error> {
    let password = args
        .flag("password")
        .map(str::to_string)
        .or_else(|| args.flag("password-env").and_then(|name| std::env::var(name).ok()))
        .or_else(|| std::env::var("SAP_PASSWORD").ok())
        .unwrap_or_default();
    let creds = credentials::Credentials {
        host: args.flag("host").unwrap_or_default().to_string(),
        port: args.flag_u16("port").unwrap_or(443),
        user: args.flag("user").unwrap_or_default().to_string(),
        password,
        client: args.flag("client").unwrap_or_default().to_string(),
        use_https: !args.flag_bool("no-https"),
    };
    creds.save(&credentials::default_path())
}

fn login_interactive() -> Result<(), Error> {
    let host = prompt("Host: ");
    let port: u16 = prompt("Port [443]: ").trim().parse().unwrap_or(443);
    let client = prompt("SAP client: ");
    let user = prompt("User: ");
    let password = prompt("Password: ");
    let use_https = !prompt("Use HTTP instead of HTTPS? [y/N]: ").trim().eq_ignore_ascii_case("y");
    let creds = credentials::Credentials { host, port, user, password, client, use_https };
    creds.save(&credentials::default_path())
}

fn prompt(label: &str) -> String {
    print!("{label}");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
    line.trim().to_string()
}

fn run_logout() -> i32 {
    match credentials::remove(&credentials::default_path()) {
        Ok(true) => {
            println!("credentials removed");
            0
        }
        Ok(false) => {
            println!("no stored credentials");
            0
        }
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    }
}

async fn run_mcp(args: &Args) -> i32 {
    let session = match session::build_session(args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return e.exit_code();
        }
    };
    match erpl_mcp::serve(session, tokio::io::stdin(), tokio::io::stdout()).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("mcp server error: {e}");
            99
        }
    }
}

async fn run_group(group_name: &str, args: &Args, format: OutputFormat, color: bool) -> i32 {
    let group = router::find_group(group_name).expect("group name already validated against GROUP_NAMES");
    if args.flag_bool("help") {
        println!("{}", group_help(group));
        return 0;
    }
    let Some((cmd, cmd_positionals)) = router::resolve_action(group, &args.positionals) else {
        eprintln!("{}", group_help(group));
        return 99;
    };
    let cmd_args = Args { positionals: cmd_positionals.to_vec(), flags: args.flags.clone() };

    let session = match session::build_session(args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", format::render_error(&e, format, color));
            return e.exit_code();
        }
    };

    match (cmd.handler)(&session, &cmd_args).await {
        Ok(value) => {
            println!("{}", format::render_value(&value, format, color));
            0
        }
        Err(e) => {
            eprintln!("{}", format::render_error(&e, format, color));
            e.exit_code()
        }
    }
}

async fn run_legacy(subcommand: &str, args: &Args, format: OutputFormat, color: bool) -> i32 {
    match legacy::dispatch(subcommand, args).await {
        Ok(value) => {
            println!("{}", format::render_value(&value, format, color));
            0
        }
        Err(e) => {
            eprintln!("{}", format::render_error(&e, format, color));
            e.exit_code()
        }
    }
}
