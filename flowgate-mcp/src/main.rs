// flowgate-mcp/src/main.rs
// ============================================================================
// Module: Flowgate MCP Entry Point
// Description: Command-line launcher for the admin shim MCP server.
// Purpose: Load configuration, apply overrides, and serve tool requests.
// Dependencies: clap, flowgate-mcp, tokio
// ============================================================================

//! ## Overview
//! The launcher resolves configuration, applies command-line overrides, and
//! starts the MCP server on the selected transport. All diagnostics go to
//! stderr so the stdio transport keeps stdout clean for framed JSON-RPC.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::ValueEnum;
use flowgate_mcp::FlowgateConfig;
use flowgate_mcp::McpServer;
use flowgate_mcp::ServerTransport;
use flowgate_mcp::StderrMetrics;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "flowgate-mcp", version, about = "MCP shim for the runtime admin API")]
struct Cli {
    /// Optional config file path (defaults to flowgate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Transport override for serving JSON-RPC requests.
    #[arg(long, value_enum, value_name = "TRANSPORT")]
    transport: Option<TransportArg>,
    /// Bind address override for the HTTP transport.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
    /// Admin API base URL override.
    #[arg(long, value_name = "URL")]
    admin_url: Option<String>,
}

/// Transport selection argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportArg {
    /// JSON-RPC over stdin/stdout with Content-Length framing.
    Stdio,
    /// JSON-RPC over HTTP POST.
    Http,
}

impl From<TransportArg> for ServerTransport {
    fn from(value: TransportArg) -> Self {
        match value {
            TransportArg::Stdio => Self::Stdio,
            TransportArg::Http => Self::Http,
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(message) => emit_error(&message),
    }
}

/// Resolves configuration and serves until the transport terminates.
async fn run() -> Result<ExitCode, String> {
    let cli = Cli::parse();
    let mut config = FlowgateConfig::load(cli.config.as_deref())
        .map_err(|err| format!("config load failed: {err}"))?;
    if let Some(admin_url) = cli.admin_url {
        config.admin.base_url = admin_url;
    }
    if let Some(transport) = cli.transport {
        config.server.transport = transport.into();
    }
    if let Some(bind) = cli.bind {
        config.server.bind = Some(bind);
    }
    let server = McpServer::from_config(config, Arc::new(StderrMetrics))
        .map_err(|err| format!("server init failed: {err}"))?;
    server.serve().await.map_err(|err| format!("server failed: {err}"))?;
    Ok(ExitCode::SUCCESS)
}

/// Writes a launcher error to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "flowgate-mcp: {message}");
    ExitCode::FAILURE
}
