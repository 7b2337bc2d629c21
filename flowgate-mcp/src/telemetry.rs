// flowgate-mcp/src/telemetry.rs
// ============================================================================
// Module: Server Telemetry
// Description: Observability hooks for transport and tool routing.
// Purpose: Provide request metric events without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for request counters and
//! latency observations. It is intentionally dependency-light so deployments
//! can plug in their preferred metrics pipeline without redesign. The default
//! sink emits JSON lines to stderr, keeping stdout free for the framed
//! JSON-RPC stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;

use crate::config::ServerTransport;
use crate::tooling::ToolName;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// JSON-RPC request method classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum McpMethod {
    /// JSON-RPC tools/list.
    ToolsList,
    /// JSON-RPC tools/call.
    ToolsCall,
    /// Invalid or malformed JSON-RPC request.
    Invalid,
    /// Unsupported JSON-RPC method.
    Other,
}

impl McpMethod {
    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::Invalid => "invalid",
            Self::Other => "other",
        }
    }
}

/// JSON-RPC request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum McpOutcome {
    /// Successful request.
    Ok,
    /// Failed request.
    Error,
}

impl McpOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Request metric event payload.
///
/// # Invariants
/// - Optional fields are `None` when the metadata is unavailable.
#[derive(Debug, Clone, Serialize)]
pub struct McpMetricEvent {
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// JSON-RPC method classification.
    pub method: McpMethod,
    /// Tool name when available (tools/call).
    pub tool: Option<ToolName>,
    /// Request outcome.
    pub outcome: McpOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for requests and latencies.
pub trait McpMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: McpMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: McpMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl McpMetrics for NoopMetrics {
    fn record_request(&self, _event: McpMetricEvent) {}

    fn record_latency(&self, _event: McpMetricEvent, _latency: Duration) {}
}

/// Metrics sink that logs JSON lines to stderr.
///
/// # Invariants
/// - Events never reach stdout; stdout carries the framed JSON-RPC stream.
pub struct StderrMetrics;

/// Stderr metric record with a stable event tag.
#[derive(Debug, Serialize)]
struct StderrMetricRecord {
    /// Event identifier.
    event: &'static str,
    /// Metric event payload.
    #[serde(flatten)]
    payload: McpMetricEvent,
    /// Observed latency in milliseconds, for latency events.
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u128>,
}

impl StderrMetrics {
    /// Writes a metric record to stderr as a JSON line.
    #[allow(clippy::print_stderr, reason = "stderr is the telemetry channel for this sink")]
    fn emit(record: &StderrMetricRecord) {
        if let Ok(payload) = serde_json::to_string(record) {
            eprintln!("{payload}");
        }
    }
}

impl McpMetrics for StderrMetrics {
    fn record_request(&self, event: McpMetricEvent) {
        Self::emit(&StderrMetricRecord {
            event: "mcp_request",
            payload: event,
            latency_ms: None,
        });
    }

    fn record_latency(&self, event: McpMetricEvent, latency: Duration) {
        Self::emit(&StderrMetricRecord {
            event: "mcp_latency",
            payload: event,
            latency_ms: Some(latency.as_millis()),
        });
    }
}
