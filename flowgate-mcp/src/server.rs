// flowgate-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: JSON-RPC 2.0 server over stdio and HTTP transports.
// Purpose: Expose the admin tool surface to agent clients.
// Dependencies: flowgate-admin, axum, bytes, tokio
// ============================================================================

//! ## Overview
//! The server exposes the admin tools using JSON-RPC 2.0. It supports a
//! framed stdio transport and an HTTP POST transport, and always routes
//! calls through [`crate::tools::ToolRouter`]. Tool output is rendered as
//! text content blocks so any MCP client can display it.
//!
//! ## Invariants
//! - Request bodies over the configured limit are rejected before parsing.
//! - Every request is recorded against the metrics sink, including failures.
//! - stdout carries only framed JSON-RPC payloads on the stdio transport.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use bytes::Bytes;
use flowgate_admin::AdminClient;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;

use crate::config::FlowgateConfig;
use crate::config::ServerTransport;
use crate::telemetry::McpMethod;
use crate::telemetry::McpMetricEvent;
use crate::telemetry::McpMetrics;
use crate::telemetry::McpOutcome;
use crate::tooling::ToolDefinition;
use crate::tooling::ToolName;
use crate::tools::ToolError;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: FlowgateConfig,
    /// Shared dispatch state.
    state: Arc<ServerState>,
}

/// Shared server state for transport handlers.
struct ServerState {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Metrics sink for request telemetry.
    metrics: Arc<dyn McpMetrics>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

impl McpServer {
    /// Builds a new server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the configuration is invalid or the
    /// admin client cannot be constructed.
    pub fn from_config(
        config: FlowgateConfig,
        metrics: Arc<dyn McpMetrics>,
    ) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let client = AdminClient::from_config(config.gateway_config())
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let router =
            ToolRouter::new(client).map_err(|err| McpServerError::Init(err.to_string()))?;
        let state = Arc::new(ServerState {
            router,
            metrics,
            max_body_bytes: config.server.max_body_bytes,
        });
        Ok(Self {
            config,
            state,
        })
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the transport fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        match self.config.server.transport {
            ServerTransport::Stdio => serve_stdio(&self.state).await,
            ServerTransport::Http => serve_http(&self.config, self.state).await,
        }
    }
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC requests over stdin/stdout with Content-Length framing.
async fn serve_stdio(state: &Arc<ServerState>) -> Result<(), McpServerError> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    loop {
        let bytes = match read_framed(&mut reader, state.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(McpServerError::Closed) => return Ok(()),
            Err(err) => return Err(err),
        };
        let (_, response) = dispatch(state, ServerTransport::Stdio, &bytes).await;
        let payload = serde_json::to_vec(&response)
            .map_err(|_| McpServerError::Transport("json-rpc serialization failed".to_string()))?;
        write_framed(&mut writer, &payload).await?;
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Serves JSON-RPC requests over HTTP POST.
async fn serve_http(
    config: &FlowgateConfig,
    state: Arc<ServerState>,
) -> Result<(), McpServerError> {
    let bind = config
        .server
        .bind
        .as_ref()
        .ok_or_else(|| McpServerError::Config("bind address required".to_string()))?;
    let addr: SocketAddr =
        bind.parse().map_err(|_| McpServerError::Config("invalid bind address".to_string()))?;
    let app = Router::new().route("/rpc", post(handle_http)).with_state(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("http bind failed".to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|_| McpServerError::Transport("http server failed".to_string()))
}

/// Handles HTTP JSON-RPC requests.
async fn handle_http(State(state): State<Arc<ServerState>>, bytes: Bytes) -> impl IntoResponse {
    if bytes.len() > state.max_body_bytes {
        let response = error_response(Value::Null, -32070, "request body too large".to_string());
        return (StatusCode::PAYLOAD_TOO_LARGE, axum::Json(response));
    }
    let (status, response) = dispatch(&state, ServerTransport::Http, bytes.as_ref()).await;
    (status, axum::Json(response))
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments. Absent arguments default to an empty object.
    #[serde(default)]
    arguments: Option<Value>,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// Text tool output.
    Text {
        /// Rendered payload text.
        text: String,
    },
}

/// Parses a request payload, handles it, and records request telemetry.
async fn dispatch(
    state: &ServerState,
    transport: ServerTransport,
    bytes: &[u8],
) -> (StatusCode, JsonRpcResponse) {
    let started = Instant::now();
    let request: Result<JsonRpcRequest, _> = serde_json::from_slice(bytes);
    let (method, tool, status, response) = match request {
        Ok(request) => {
            let method = classify_method(&request);
            let tool = tool_of(&request);
            let (status, response) = handle_request(state, request).await;
            (method, tool, status, response)
        }
        Err(_) => {
            let response =
                error_response(Value::Null, -32600, "invalid json-rpc request".to_string());
            (McpMethod::Invalid, None, StatusCode::BAD_REQUEST, response)
        }
    };
    let event = McpMetricEvent {
        transport,
        method,
        tool,
        outcome: if response.error.is_none() { McpOutcome::Ok } else { McpOutcome::Error },
        error_code: response.error.as_ref().map(|error| error.code),
        request_bytes: bytes.len(),
        response_bytes: serde_json::to_vec(&response).map(|payload| payload.len()).unwrap_or(0),
    };
    state.metrics.record_request(event.clone());
    state.metrics.record_latency(event, started.elapsed());
    (status, response)
}

/// Classifies the JSON-RPC method for telemetry labeling.
fn classify_method(request: &JsonRpcRequest) -> McpMethod {
    match request.method.as_str() {
        "tools/list" => McpMethod::ToolsList,
        "tools/call" => McpMethod::ToolsCall,
        _ => McpMethod::Other,
    }
}

/// Extracts the tool name from a tools/call request for telemetry labeling.
fn tool_of(request: &JsonRpcRequest) -> Option<ToolName> {
    if request.method != "tools/call" {
        return None;
    }
    request
        .params
        .as_ref()
        .and_then(|params| params.get("name"))
        .and_then(Value::as_str)
        .and_then(ToolName::parse)
}

/// Dispatches a JSON-RPC request to the tool router.
async fn handle_request(
    state: &ServerState,
    request: JsonRpcRequest,
) -> (StatusCode, JsonRpcResponse) {
    if request.jsonrpc != "2.0" {
        return (
            StatusCode::BAD_REQUEST,
            error_response(request.id, -32600, "invalid json-rpc version".to_string()),
        );
    }
    match request.method.as_str() {
        "tools/list" => {
            let result = ToolListResult {
                tools: state.router.list_tools(),
            };
            match serde_json::to_value(result) {
                Ok(value) => (StatusCode::OK, ok_response(request.id, value)),
                Err(_) => jsonrpc_error(request.id, &ToolError::Serialization),
            }
        }
        "tools/call" => {
            let id = request.id;
            let params = request.params.unwrap_or(Value::Null);
            let Ok(call) = serde_json::from_value::<ToolCallParams>(params) else {
                return (
                    StatusCode::BAD_REQUEST,
                    error_response(id, -32602, "invalid tool params".to_string()),
                );
            };
            let arguments = call.arguments.unwrap_or_else(|| json!({}));
            match state.router.handle_tool_call(&call.name, arguments).await {
                Ok(text) => {
                    let result = ToolCallResult {
                        content: vec![ToolContent::Text {
                            text,
                        }],
                    };
                    match serde_json::to_value(result) {
                        Ok(value) => (StatusCode::OK, ok_response(id, value)),
                        Err(_) => jsonrpc_error(id, &ToolError::Serialization),
                    }
                }
                Err(err) => jsonrpc_error(id, &err),
            }
        }
        _ => (
            StatusCode::BAD_REQUEST,
            error_response(request.id, -32601, "method not found".to_string()),
        ),
    }
}

/// Builds a successful JSON-RPC response envelope.
fn ok_response(id: Value, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: Some(result),
        error: None,
    }
}

/// Builds a failed JSON-RPC response envelope.
fn error_response(id: Value, code: i64, message: String) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message,
        }),
    }
}

/// Builds a JSON-RPC error response for a tool failure.
fn jsonrpc_error(id: Value, error: &ToolError) -> (StatusCode, JsonRpcResponse) {
    let (status, code, message) = match error {
        ToolError::UnknownTool => (StatusCode::BAD_REQUEST, -32601, "unknown tool".to_string()),
        ToolError::InvalidParams(message) => (StatusCode::BAD_REQUEST, -32602, message.clone()),
        ToolError::Admin(err) => (StatusCode::OK, -32000, err.to_string()),
        ToolError::Serialization => (StatusCode::OK, -32060, "serialization failed".to_string()),
    };
    (status, error_response(id, code, message))
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Reads a framed stdio payload using MCP Content-Length headers.
async fn read_framed(
    reader: &mut BufReader<impl tokio::io::AsyncRead + Unpin>,
    max_body_bytes: usize,
) -> Result<Vec<u8>, McpServerError> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .await
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            return Err(McpServerError::Closed);
        }
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(buf)
}

/// Writes a framed stdio payload using MCP Content-Length headers.
async fn write_framed(
    writer: &mut (impl tokio::io::AsyncWrite + Unpin),
    payload: &[u8],
) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .await
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .await
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .flush()
        .await
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
    /// Client closed the stdio stream.
    #[error("stdio closed")]
    Closed,
}
