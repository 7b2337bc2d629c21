// flowgate-admin/src/gateway/tests.rs
// ============================================================================
// Module: Gateway Tests
// Description: Unit tests for gateway message extraction and configuration.
// Purpose: Validate the best-effort error-body handling.
// Dependencies: serde_json
// ============================================================================

//! Test-only lint relaxations for panic-based assertions.
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use super::AdminGateway;
use super::AdminGatewayConfig;
use super::extract_error_message;

#[test]
fn extract_error_message_reads_json_message_field() {
    let body = r#"{"message": "service revision mismatch", "restate_code": "META0006"}"#;
    assert_eq!(extract_error_message(body), "service revision mismatch");
}

#[test]
fn extract_error_message_falls_back_when_message_is_not_a_string() {
    let body = r#"{"message": 42}"#;
    assert_eq!(extract_error_message(body), body);
}

#[test]
fn extract_error_message_falls_back_for_non_json_bodies() {
    let body = "<html>502 Bad Gateway</html>";
    assert_eq!(extract_error_message(body), body);
}

#[test]
fn extract_error_message_falls_back_for_json_without_message() {
    let body = r#"{"error": "nope"}"#;
    assert_eq!(extract_error_message(body), body);
}

#[test]
fn gateway_trims_trailing_slashes_from_base_url() {
    let gateway = AdminGateway::new(AdminGatewayConfig {
        base_url: "http://localhost:9070///".to_string(),
        ..AdminGatewayConfig::default()
    })
    .unwrap();
    assert_eq!(gateway.base_url(), "http://localhost:9070");
}
