// flowgate-admin/tests/admin_client.rs
// ============================================================================
// Module: Admin Client Tests
// Description: End-to-end tests against a stub runtime admin endpoint.
// Purpose: Validate gateway behavior, error extraction, and operations.
// Dependencies: flowgate-admin, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Tests the admin client against local stub servers for:
//! - Happy path: deployment registration, service listing, introspection
//! - Empty-body handling: 204 responses never attempt a JSON parse
//! - Error handling: non-2xx message extraction with JSON and raw bodies
//! - Decode discipline: content-type enforcement and bounded previews
//! - Header precedence: caller-supplied identity headers win

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::thread;

use flowgate_admin::AdminClient;
use flowgate_admin::AdminError;
use flowgate_admin::AdminGateway;
use flowgate_admin::AdminGatewayConfig;
use flowgate_admin::Deployment;
use flowgate_admin::RegisterDeploymentRequest;
use flowgate_admin::ServicePatch;
use reqwest::Method;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Request details captured by the stub server.
struct Captured {
    /// HTTP method.
    method: String,
    /// Request path including the query string.
    path: String,
    /// Request body text.
    body: String,
    /// Request headers as lowercase name/value pairs.
    headers: Vec<(String, String)>,
}

impl Captured {
    /// Returns the first header value with the given lowercase name.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// Spawns a stub server answering one request with the given response.
fn spawn_server(
    status: u16,
    body: &'static str,
    content_type: &'static str,
) -> (String, thread::JoinHandle<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut request_body = String::new();
        request.as_reader().read_to_string(&mut request_body).unwrap();
        let captured = Captured {
            method: request.method().as_str().to_string(),
            path: request.url().to_string(),
            body: request_body,
            headers: request
                .headers()
                .iter()
                .map(|header| {
                    (header.field.as_str().as_str().to_ascii_lowercase(), header.value.to_string())
                })
                .collect(),
        };
        let response = if status == 204 {
            Response::empty(204).boxed()
        } else {
            Response::from_string(body)
                .with_status_code(status)
                .with_header(
                    Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()).unwrap(),
                )
                .boxed()
        };
        request.respond(response).unwrap();
        captured
    });

    (url, handle)
}

/// Builds a client pointed at the stub server.
fn client_for(url: &str) -> AdminClient {
    AdminClient::from_config(AdminGatewayConfig {
        base_url: url.to_string(),
        ..AdminGatewayConfig::default()
    })
    .unwrap()
}

// ============================================================================
// SECTION: Deployment Operations
// ============================================================================

#[tokio::test]
async fn create_deployment_round_trips_the_echoed_registration() {
    let (url, handle) = spawn_server(
        201,
        r#"{"id": "dep_1", "services": [{"name": "Greeter", "revision": 1}]}"#,
        "application/json",
    );
    let client = client_for(&url);

    let request = RegisterDeploymentRequest {
        uri: Some("http://svc:9080".to_string()),
        force: Some(true),
        ..RegisterDeploymentRequest::default()
    };
    let response = client.create_deployment(&request).await.unwrap();
    assert_eq!(response.id, "dep_1");
    assert_eq!(response.services.len(), 1);
    assert_eq!(response.services[0].name, "Greeter");

    let captured = handle.join().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/deployments");
    let body: Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body, json!({"uri": "http://svc:9080", "force": true}));
    assert_eq!(captured.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn delete_deployment_accepts_204_without_parsing() {
    let (url, handle) = spawn_server(204, "", "application/json");
    let client = client_for(&url);

    client.delete_deployment("dep_1", true).await.unwrap();

    let captured = handle.join().unwrap();
    assert_eq!(captured.method, "DELETE");
    assert_eq!(captured.path, "/deployments/dep_1?force=true");
}

#[tokio::test]
async fn list_deployments_validates_the_discriminated_union() {
    let (url, _handle) = spawn_server(
        200,
        r#"{"deployments": [
            {"id": "dp_1", "services": [], "uri": "http://a:9080",
             "protocol_type": "RequestResponse", "min_protocol_version": 1,
             "max_protocol_version": 5, "created_at": "2026-02-10T08:00:00Z"},
            {"id": "dp_2", "services": [],
             "arn": "arn:aws:lambda:eu-central-1:123456789012:function:b",
             "min_protocol_version": 1, "max_protocol_version": 5,
             "created_at": "2026-02-10T08:00:00Z"}
        ]}"#,
        "application/json",
    );
    let client = client_for(&url);

    let deployments = client.list_deployments().await.unwrap();
    assert_eq!(deployments.len(), 2);
    assert!(matches!(deployments[0], Deployment::Http(_)));
    assert!(matches!(deployments[1], Deployment::Function(_)));
}

// ============================================================================
// SECTION: Error Handling
// ============================================================================

#[tokio::test]
async fn remote_error_extracts_json_message_field() {
    let (url, _handle) = spawn_server(
        409,
        r#"{"message": "deployment endpoint conflict", "code": "META0004"}"#,
        "application/json",
    );
    let client = client_for(&url);

    let err = client.get_deployment("dep_1").await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("409"));
    assert!(text.contains("Conflict"));
    assert!(text.contains("deployment endpoint conflict"));
}

#[tokio::test]
async fn remote_error_passes_non_json_bodies_verbatim() {
    let (url, _handle) = spawn_server(502, "<html>upstream timeout</html>", "text/html");
    let client = client_for(&url);

    let err = client.list_services().await.unwrap_err();
    let AdminError::Remote {
        status,
        message,
        ..
    } = err
    else {
        panic!("expected remote error, got {err}");
    };
    assert_eq!(status, 502);
    assert_eq!(message, "<html>upstream timeout</html>");
}

#[tokio::test]
async fn unparseable_success_body_is_a_wrapped_transport_failure() {
    let (url, _handle) = spawn_server(200, "not json at all", "application/json");
    let gateway = AdminGateway::new(AdminGatewayConfig {
        base_url: url,
        ..AdminGatewayConfig::default()
    })
    .unwrap();

    let err = gateway
        .request(Method::GET, "/deployments", HeaderMap::new(), None)
        .await
        .unwrap_err();
    let AdminError::Transport {
        url: failed_url,
        ..
    } = err
    else {
        panic!("expected transport error, got {err}");
    };
    assert!(failed_url.ends_with("/deployments"));
}

// ============================================================================
// SECTION: Service Operations
// ============================================================================

#[tokio::test]
async fn modify_service_sends_only_supplied_patch_fields() {
    let (url, handle) = spawn_server(
        200,
        r#"{"name": "Greeter", "handlers": [], "ty": "Service",
            "deployment_id": "dp_1", "revision": 1, "public": false,
            "idempotency_retention": "1day"}"#,
        "application/json",
    );
    let client = client_for(&url);

    let patch = ServicePatch {
        public: Some(false),
        idempotency_retention: None,
    };
    let service = client.modify_service("Greeter", &patch).await.unwrap();
    assert!(!service.public);

    let captured = handle.join().unwrap();
    assert_eq!(captured.method, "PATCH");
    assert_eq!(captured.path, "/services/Greeter");
    let body: Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body, json!({"public": false}));
}

// ============================================================================
// SECTION: Introspection Queries
// ============================================================================

#[tokio::test]
async fn list_invocations_substitutes_fallbacks_for_missing_columns() {
    let (url, handle) = spawn_server(
        200,
        r#"{"rows": [
            {"id": "inv_1", "target_service_name": "Greeter",
             "target_handler_name": "greet", "status": "Running",
             "created_at": "2026-02-10T08:00:00Z"}
        ]}"#,
        "application/json",
    );
    let client = client_for(&url);

    let invocations = client.list_invocations().await.unwrap();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].id, "inv_1");
    assert_eq!(invocations[0].completed_at, None);
    assert_eq!(invocations[0].target_key, None);

    let captured = handle.join().unwrap();
    let body: Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(
        body["query"].as_str().unwrap(),
        "SELECT * FROM sys_invocation WHERE status = 'Running'"
    );
}

#[tokio::test]
async fn run_query_rejects_non_json_content_types() {
    let (url, _handle) = spawn_server(200, "id,status\ninv_1,Running", "text/csv");
    let client = client_for(&url);

    let err = client.run_query("SELECT id FROM sys_invocation").await.unwrap_err();
    let AdminError::Decode(message) = err else {
        panic!("expected decode error, got {err}");
    };
    assert!(message.contains("text/csv"));
}

#[tokio::test]
async fn run_query_bounds_the_preview_of_unparseable_payloads() {
    let (url, _handle) = spawn_server(
        200,
        "this body claims to be json but is definitely not json and it keeps going on and on",
        "application/json",
    );
    let client = client_for(&url);

    let err = client.run_query("SELECT 1").await.unwrap_err();
    let AdminError::Decode(message) = err else {
        panic!("expected decode error, got {err}");
    };
    assert!(message.contains("this body claims to be json"));
    assert!(!message.contains("keeps going on and on"));
}

// ============================================================================
// SECTION: Header Precedence
// ============================================================================

#[tokio::test]
async fn client_identity_header_is_attached_by_default() {
    let (url, handle) = spawn_server(200, r#"{"services": []}"#, "application/json");
    let client = client_for(&url);

    client.list_services().await.unwrap();

    let captured = handle.join().unwrap();
    let identity = captured.header("x-flowgate-client").unwrap();
    assert!(identity.starts_with("flowgate-mcp/"));
}

#[tokio::test]
async fn caller_supplied_identity_header_wins() {
    let (url, handle) = spawn_server(200, r#"{"services": []}"#, "application/json");
    let gateway = AdminGateway::new(AdminGatewayConfig {
        base_url: url,
        ..AdminGatewayConfig::default()
    })
    .unwrap();

    let mut headers = HeaderMap::new();
    headers.insert("x-flowgate-client", HeaderValue::from_static("custom-agent/9"));
    gateway.request(Method::GET, "/services", headers, None).await.unwrap();

    let captured = handle.join().unwrap();
    assert_eq!(captured.header("x-flowgate-client"), Some("custom-agent/9"));
}
