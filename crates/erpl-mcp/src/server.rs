// SPDX-License-Identifier: MIT OR Apache-2.0
//! Newline-delimited JSON-RPC stdio server: reads one request per line from
//! stdin, dispatches `tools/list` and `tools/call`, writes one JSON
//! response per line to stdout (§4.6).

use erpl_session::AdtSession;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::handlers::execute;
use crate::registry::tool_definitions;

/// Run the stdio server loop until stdin closes.
pub async fn serve<R, W>(session: AdtSession, stdin: R, mut stdout: W) -> std::io::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(stdin).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = handle_line(&session, line).await;
        let mut encoded = serde_json::to_string(&response).unwrap_or_else(|_| {
            json!({"jsonrpc": "2.0", "id": Value::Null, "error": {"code": -32603, "message": "internal error encoding response"}}).to_string()
        });
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

async fn handle_line(session: &AdtSession, line: &str) -> Value {
    let request: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return json!({
                "jsonrpc": "2.0",
                "id": Value::Null,
                "error": { "code": -32700, "message": format!("parse error: {e}") },
            })
        }
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();

    match method {
        "tools/list" => {
            let tools: Vec<Value> = tool_definitions()
                .into_iter()
                .map(|def| json!({ "name": def.name, "description": def.description, "inputSchema": def.input_schema }))
                .collect();
            json!({ "jsonrpc": "2.0", "id": id, "result": { "tools": tools } })
        }
        "tools/call" => {
            let params = request.get("params").cloned().unwrap_or(Value::Null);
            let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
            let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
            let result = execute(session, name, &arguments).await;
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "isError": result.is_error, "content": result.content },
            })
        }
        other => {
            warn!(method = other, "unknown JSON-RPC method");
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("unknown method: {other}") },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpl_session::SessionConfig;
    use erpl_types::SapClient;

    fn session() -> AdtSession {
        AdtSession::new(SessionConfig::new("example.invalid", 443, true, SapClient::parse("100").unwrap())).unwrap()
    }

    #[tokio::test]
    async fn tools_list_returns_twenty_tools() {
        let session = session();
        let response = handle_line(&session, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 20);
    }

    #[tokio::test]
    async fn unknown_method_yields_json_rpc_error() {
        let session = session();
        let response = handle_line(&session, r#"{"jsonrpc":"2.0","id":2,"method":"bogus"}"#).await;
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn malformed_line_yields_parse_error() {
        let session = session();
        let response = handle_line(&session, "not json").await;
        assert_eq!(response["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn serve_echoes_responses_line_delimited() {
        let session = session();
        let input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n".to_vec();
        let mut output = Vec::new();
        serve(session, input.as_slice(), &mut output).await.unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 1);
        let parsed: Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(parsed["result"]["tools"].as_array().unwrap().len(), 20);
    }
}
