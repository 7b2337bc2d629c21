// flowgate-mcp/src/tools/tests.rs
// ============================================================================
// Module: Tool Router Unit Tests
// Description: Validates argument gating and decode shapes without a runtime.
// Purpose: Ensure invalid calls are rejected before any admin API traffic.
// Dependencies: flowgate-admin, serde_json, tokio
// ============================================================================

//! ## Overview
//! Exercises the validation path of the tool router. No admin endpoint is
//! running, so any test that reaches the network would fail with a transport
//! error rather than the expected validation error.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only validation helpers use panic-based assertions for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use flowgate_admin::AdminClient;
use flowgate_admin::AdminGatewayConfig;
use serde_json::json;

use super::ToolError;
use super::ToolRouter;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn router() -> ToolRouter {
    let client = AdminClient::from_config(AdminGatewayConfig::default())
        .expect("client construction failed");
    ToolRouter::new(client).expect("router construction failed")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let result = router().handle_tool_call("scenario_define", json!({})).await;
    assert!(matches!(result, Err(ToolError::UnknownTool)));
}

#[tokio::test]
async fn missing_required_argument_is_rejected_with_field_context() {
    let result = router().handle_tool_call("get-deployment", json!({})).await;
    let Err(ToolError::InvalidParams(message)) = result else {
        panic!("expected invalid parameters, got {result:?}");
    };
    assert!(message.contains("deploymentId"), "message missing field context: {message}");
}

#[tokio::test]
async fn unknown_argument_is_rejected() {
    let result = router()
        .handle_tool_call("get-deployment", json!({ "deploymentId": "dep_1", "extra": 1 }))
        .await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))));
}

#[tokio::test]
async fn wrong_argument_type_is_rejected() {
    let result = router().handle_tool_call("query", json!({ "query": 42 })).await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))));
}

#[tokio::test]
async fn empty_query_text_is_rejected() {
    let result = router().handle_tool_call("query", json!({ "query": "" })).await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))));
}

#[tokio::test]
async fn create_deployment_with_both_endpoints_is_rejected() {
    let result = router()
        .handle_tool_call(
            "create-deployment",
            json!({
                "uri": "http://greeter:9080",
                "arn": "arn:aws:lambda:us-east-1:1:function:g:1"
            }),
        )
        .await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))));
}

#[tokio::test]
async fn create_deployment_with_no_endpoint_is_rejected() {
    let result = router().handle_tool_call("create-deployment", json!({})).await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))));
}

#[tokio::test]
async fn argumentless_tools_reject_stray_arguments() {
    let result = router().handle_tool_call("list-deployments", json!({ "limit": 10 })).await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))));
}
