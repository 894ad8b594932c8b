//! MCP Server implementation
//!
//! Implements the Model Context Protocol server over line-delimited JSON-RPC.
//! Each `tools/call` runs as its own task so slow model calls do not block the
//! rest of the session; closing the input abandons whatever is still running.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};

use crate::error::{McpError, Result};
use crate::mcp::tools::Dispatcher;
use crate::mcp::types::*;

/// MCP Server info
const SERVER_NAME: &str = "bedrock-investment-advisor";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What to do with one incoming message
enum Action {
    Respond(JsonRpcResponse),
    Dispatch(RequestId, CallToolParams),
    Cancel(RequestId),
    Ignore,
}

/// MCP Server for the investment advisor tools
pub struct McpServer {
    /// Tool dispatcher, shared with in-flight calls
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Run the server on stdio
    pub async fn run_stdio(&self) -> Result<()> {
        self.run(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`,
    /// until `reader` reaches end of input.
    pub async fn run<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut in_flight: JoinSet<()> = JoinSet::new();
        let mut handles: HashMap<RequestId, AbortHandle> = HashMap::new();

        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }

            let action = match std::str::from_utf8(&line) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => self.handle_message(text),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping line that is not UTF-8");
                    Action::Respond(JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Invalid UTF-8: {}", e)),
                    ))
                }
            };

            while in_flight.try_join_next().is_some() {}
            handles.retain(|_, handle| !handle.is_finished());

            match action {
                Action::Respond(response) => {
                    if tx.send(response).is_err() {
                        break;
                    }
                }
                Action::Dispatch(id, _) if handles.contains_key(&id) => {
                    tracing::warn!(request_id = ?id, "Rejecting tool call reusing an in-flight id");
                    let response = JsonRpcResponse::error(
                        Some(id),
                        JsonRpcError::invalid_request("Request id is already in flight"),
                    );
                    if tx.send(response).is_err() {
                        break;
                    }
                }
                Action::Dispatch(id, params) => {
                    let dispatcher = self.dispatcher.clone();
                    let tx = tx.clone();
                    let response_id = id.clone();
                    let handle = in_flight.spawn(async move {
                        let result = dispatcher.call_tool(&params.name, params.arguments).await;
                        let _ = tx.send(JsonRpcResponse::from_result(Some(response_id), &result));
                    });
                    handles.insert(id, handle);
                }
                Action::Cancel(id) => {
                    if let Some(handle) = handles.remove(&id) {
                        tracing::info!(request_id = ?id, "Cancelling tool call");
                        handle.abort();
                    }
                }
                Action::Ignore => {}
            }
        }

        if !in_flight.is_empty() {
            tracing::info!(count = in_flight.len(), "Input closed, abandoning in-flight tool calls");
        }
        in_flight.shutdown().await;
        drop(tx);

        writer_task.await.map_err(|e| McpError::TransportError {
            message: e.to_string(),
        })?
    }

    /// Decide how to handle an incoming JSON-RPC message
    fn handle_message(&self, message: &str) -> Action {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                return Action::Respond(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        match request.method.as_str() {
            methods::INITIALIZE => Action::Respond(JsonRpcResponse::from_result(
                request.id,
                &self.initialize_result(),
            )),
            methods::INITIALIZED => {
                tracing::info!("Client initialized");
                Action::Ignore
            }
            methods::CANCELLED => match request
                .params
                .and_then(|p| serde_json::from_value::<CancelledParams>(p).ok())
            {
                Some(params) => Action::Cancel(params.request_id),
                None => Action::Ignore,
            },
            methods::PING => Action::Respond(JsonRpcResponse::success(
                request.id,
                serde_json::json!({}),
            )),
            methods::LIST_TOOLS => Action::Respond(JsonRpcResponse::from_result(
                request.id,
                &ListToolsResult {
                    tools: self.dispatcher.list_tools(),
                },
            )),
            methods::CALL_TOOL if request.id.is_none() => {
                tracing::warn!("Ignoring tools/call sent as a notification");
                Action::Ignore
            }
            methods::CALL_TOOL => {
                let params = request
                    .params
                    .ok_or_else(|| "Missing tool parameters".to_string())
                    .and_then(|p| {
                        serde_json::from_value::<CallToolParams>(p)
                            .map_err(|e| format!("Invalid tool parameters: {}", e))
                    });
                match params {
                    Ok(params) => match request.id {
                        Some(id) => Action::Dispatch(id, params),
                        None => Action::Ignore,
                    },
                    Err(message) => Action::Respond(JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(message),
                    )),
                }
            }
            _ if request.id.is_none() => Action::Ignore,
            _ => Action::Respond(JsonRpcResponse::error(
                request.id,
                JsonRpcError::method_not_found(&request.method),
            )),
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        }
    }
}

/// Write each response as one line until every sender is gone
async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
