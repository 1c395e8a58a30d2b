//! MCP server over stdio.
//!
//! Implements the line-delimited JSON-RPC subset MCP clients speak:
//! `initialize`, `ping`, `tools/list`, and `tools/call`. One request per
//! line on stdin, one response per line on stdout; notifications (requests
//! without an id) are accepted and not answered. Tool failures travel back
//! inside the `tools/call` result with `isError: true`, never as a process
//! fault.

use crate::tools::ToolRegistry;
use crate::{McpError, McpResult};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, instrument};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server for Hokusai.
pub struct McpServer {
    name: String,
    version: String,
    tools: ToolRegistry,
}

impl McpServer {
    /// Creates a new server builder.
    pub fn builder() -> McpServerBuilder {
        McpServerBuilder::default()
    }

    /// Runs the server using stdio transport until stdin closes.
    #[instrument(skip(self))]
    pub async fn run_stdio(self) -> McpResult<()> {
        info!(
            name = %self.name,
            version = %self.version,
            tools = self.tools.len(),
            "MCP server listening on stdio"
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| McpError::TransportError(e.to_string()))?
        {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut payload = response.to_string();
                payload.push('\n');
                stdout
                    .write_all(payload.as_bytes())
                    .await
                    .map_err(|e| McpError::TransportError(e.to_string()))?;
                stdout
                    .flush()
                    .await
                    .map_err(|e| McpError::TransportError(e.to_string()))?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one request line. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let request: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                return Some(error_response(
                    Value::Null,
                    -32700,
                    &format!("parse error: {e}"),
                ));
            }
        };

        let id = request.get("id").cloned();
        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let params = request.get("params").cloned().unwrap_or_else(|| json!({}));

        // A request without an id is a notification; process nothing, answer
        // nothing.
        let id = id?;

        let response = match method {
            "initialize" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": { "name": self.name, "version": self.version }
                }
            }),
            "ping" => json!({ "jsonrpc": "2.0", "id": id, "result": {} }),
            "tools/list" => {
                let tools: Vec<Value> = self
                    .tools
                    .list()
                    .iter()
                    .map(|tool| {
                        json!({
                            "name": tool.name(),
                            "description": tool.description(),
                            "inputSchema": tool.input_schema()
                        })
                    })
                    .collect();
                json!({ "jsonrpc": "2.0", "id": id, "result": { "tools": tools } })
            }
            "tools/call" => {
                let name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
                let arguments = params
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                match self.tools.execute(name, arguments).await {
                    Ok(result) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": {
                            "content": [{ "type": "text", "text": result.to_string() }],
                            "isError": false
                        }
                    }),
                    Err(e) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": {
                            "content": [{ "type": "text", "text": e.to_string() }],
                            "isError": true
                        }
                    }),
                }
            }
            other => error_response(id, -32601, &format!("method not found: {other}")),
        };
        Some(response)
    }
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

/// Builder for the MCP server.
#[derive(Default)]
pub struct McpServerBuilder {
    name: Option<String>,
    version: Option<String>,
    tools: Option<ToolRegistry>,
}

impl McpServerBuilder {
    /// Sets the server name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the server version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the tool registry.
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Builds the server.
    pub fn build(self) -> McpResult<McpServer> {
        Ok(McpServer {
            name: self.name.unwrap_or_else(|| "hokusai".to_string()),
            version: self
                .version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            tools: self.tools.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> McpServer {
        McpServer::builder()
            .name("hokusai")
            .version("0.1.0")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(response["result"]["serverInfo"]["name"], "hokusai");
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn notifications_get_no_answer() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_a_jsonrpc_error() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_in_band() {
        let line = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"nope"}}"#;
        let response = server().handle_line(line).await.unwrap();
        assert_eq!(response["result"]["isError"], true);
        assert!(
            response["result"]["content"][0]["text"]
                .as_str()
                .unwrap()
                .contains("Tool not found")
        );
    }

    #[tokio::test]
    async fn garbage_input_is_a_parse_error() {
        let response = server().handle_line("{not json").await.unwrap();
        assert_eq!(response["error"]["code"], -32700);
    }
}
