// flowgate-mcp/src/lib.rs
// ============================================================================
// Module: Flowgate MCP
// Description: MCP server exposing the runtime admin API as agent tools.
// Purpose: Translate MCP tool calls into single admin API requests.
// Dependencies: flowgate-admin, axum, jsonschema, tokio
// ============================================================================

//! ## Overview
//! Flowgate MCP binds each [`flowgate_admin::AdminClient`] operation to an
//! externally named tool with a declared argument shape and serves the
//! resulting tool surface over JSON-RPC 2.0. All tool handlers are thin
//! wrappers over exactly one admin operation; no tool combines or
//! orchestrates multiple calls, and no state is retained across calls.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod server;
pub mod telemetry;
pub mod tooling;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::FlowgateConfig;
pub use config::ServerTransport;
pub use server::McpServer;
pub use server::McpServerError;
pub use telemetry::McpMetrics;
pub use telemetry::NoopMetrics;
pub use telemetry::StderrMetrics;
pub use tooling::ToolDefinition;
pub use tooling::ToolName;
pub use tooling::tool_definitions;
pub use tools::ToolError;
pub use tools::ToolRouter;
