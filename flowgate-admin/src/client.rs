// flowgate-admin/src/client.rs
// ============================================================================
// Module: Admin API Client
// Description: Named operations over the runtime admin API.
// Purpose: Compose one gateway call plus one schema validation per operation.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Each operation is a thin composition: build the target path, pick the
//! HTTP method, call the gateway, validate the result through the matching
//! schema type, return the validated value. Operations never mutate local
//! copies; every call round-trips to the runtime and returns a freshly
//! validated snapshot.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;

use crate::error::AdminError;
use crate::gateway::AdminGateway;
use crate::gateway::AdminGatewayConfig;
use crate::schema::Deployment;
use crate::schema::InvocationSummary;
use crate::schema::ListDeploymentsResponse;
use crate::schema::ListServicesResponse;
use crate::schema::RegisterDeploymentResponse;
use crate::schema::Service;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed introspection query behind `list_invocations`.
///
/// The status literal is matched case-sensitively by the runtime; keep it
/// byte-for-byte in sync with the runtime's lifecycle state labels.
pub const RUNNING_INVOCATIONS_QUERY: &str =
    "SELECT * FROM sys_invocation WHERE status = 'Running'";

// ============================================================================
// SECTION: Request Shapes
// ============================================================================

/// Deployment registration request.
///
/// # Invariants
/// - Exactly one of `uri` / `arn` must be supplied; the serialized body
///   contains only the fields the caller actually set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDeploymentRequest {
    /// HTTP endpoint URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Remote function identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// Role assumed when invoking a remote function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assume_role_arn: Option<String>,
    /// Extra headers attached to runtime-to-service requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_headers: Option<BTreeMap<String, String>>,
    /// Force HTTP/1.1 instead of negotiating HTTP/2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_http_11: Option<bool>,
    /// Overwrite an existing deployment at the same endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    /// Discover without registering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl RegisterDeploymentRequest {
    /// Checks the endpoint-kind discriminant before the request is sent.
    fn validate(&self) -> Result<(), AdminError> {
        match (&self.uri, &self.arn) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) => Err(AdminError::validation(
                "uri",
                "uri and arn are mutually exclusive",
            )),
            (None, None) => {
                Err(AdminError::validation("uri", "one of uri or arn is required"))
            }
        }
    }
}

/// Partial service modification.
///
/// # Invariants
/// - Only caller-supplied fields are serialized; an unset field is never
///   sent as an explicit null that could be read as "clear this field".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePatch {
    /// New public-visibility flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// New idempotency retention duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_retention: Option<String>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Typed client for the runtime admin API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    /// Gateway issuing the outbound requests.
    gateway: AdminGateway,
}

impl AdminClient {
    /// Creates a client over an existing gateway.
    #[must_use]
    pub const fn new(gateway: AdminGateway) -> Self {
        Self {
            gateway,
        }
    }

    /// Builds a client from gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the HTTP client cannot be built.
    pub fn from_config(config: AdminGatewayConfig) -> Result<Self, AdminError> {
        Ok(Self::new(AdminGateway::new(config)?))
    }

    /// Returns the underlying gateway.
    #[must_use]
    pub const fn gateway(&self) -> &AdminGateway {
        &self.gateway
    }

    /// Lists all registered deployments.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the request or validation fails.
    pub async fn list_deployments(&self) -> Result<Vec<Deployment>, AdminError> {
        let value = self.require_body(Method::GET, "/deployments", None).await?;
        let parsed: ListDeploymentsResponse = decode("deployments", value)?;
        Ok(parsed.deployments)
    }

    /// Fetches one deployment by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the request or validation fails.
    pub async fn get_deployment(&self, deployment_id: &str) -> Result<Deployment, AdminError> {
        let path = format!("/deployments/{deployment_id}");
        let value = self.require_body(Method::GET, &path, None).await?;
        decode("deployment", value)
    }

    /// Registers a new deployment.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the endpoint-kind discriminant is
    /// invalid or the request fails.
    pub async fn create_deployment(
        &self,
        request: &RegisterDeploymentRequest,
    ) -> Result<RegisterDeploymentResponse, AdminError> {
        request.validate()?;
        let body = serde_json::to_value(request)
            .map_err(|err| AdminError::validation("deployment", err.to_string()))?;
        let value = self.require_body(Method::POST, "/deployments", Some(&body)).await?;
        decode("deployment", value)
    }

    /// Deletes a deployment, forcing by default.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the request fails.
    pub async fn delete_deployment(
        &self,
        deployment_id: &str,
        force: bool,
    ) -> Result<(), AdminError> {
        let path = format!("/deployments/{deployment_id}?force={force}");
        self.gateway.request(Method::DELETE, &path, HeaderMap::new(), None).await?;
        Ok(())
    }

    /// Lists all registered services.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the request or validation fails.
    pub async fn list_services(&self) -> Result<Vec<Service>, AdminError> {
        let value = self.require_body(Method::GET, "/services", None).await?;
        let parsed: ListServicesResponse = decode("services", value)?;
        Ok(parsed.services)
    }

    /// Fetches one service by name.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the request or validation fails.
    pub async fn get_service(&self, service_name: &str) -> Result<Service, AdminError> {
        let path = format!("/services/{service_name}");
        let value = self.require_body(Method::GET, &path, None).await?;
        decode("service", value)
    }

    /// Applies a partial modification to a service.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the request or validation fails.
    pub async fn modify_service(
        &self,
        service_name: &str,
        patch: &ServicePatch,
    ) -> Result<Service, AdminError> {
        let path = format!("/services/{service_name}");
        let body = serde_json::to_value(patch)
            .map_err(|err| AdminError::validation("service", err.to_string()))?;
        let value = self.require_body(Method::PATCH, &path, Some(&body)).await?;
        decode("service", value)
    }

    /// Lists running invocations via the fixed introspection query.
    ///
    /// Rows are schemaless at the edge; missing columns substitute
    /// fallbacks instead of erroring.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the query request fails.
    pub async fn list_invocations(&self) -> Result<Vec<InvocationSummary>, AdminError> {
        let result = self.run_query(RUNNING_INVOCATIONS_QUERY).await?;
        let rows = match &result {
            Value::Array(rows) => rows.as_slice(),
            value => value.get("rows").and_then(Value::as_array).map_or(&[][..], Vec::as_slice),
        };
        Ok(rows.iter().map(InvocationSummary::from_row).collect())
    }

    /// Forwards a free-form read-only query to the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Decode`] when the response representation is
    /// not JSON, and [`AdminError`] for request failures.
    pub async fn run_query(&self, query: &str) -> Result<Value, AdminError> {
        let body = json!({ "query": query });
        let value = self
            .gateway
            .request_checked(Method::POST, "/query", HeaderMap::new(), Some(&body))
            .await?;
        Ok(value.unwrap_or(Value::Null))
    }

    /// Issues a request whose contract requires a response body.
    async fn require_body(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, AdminError> {
        let value = self.gateway.request(method, path, HeaderMap::new(), body).await?;
        value.ok_or_else(|| AdminError::validation(path.to_string(), "empty response body"))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a runtime payload through the matching schema type.
fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, AdminError> {
    serde_json::from_value(value).map_err(|err| AdminError::validation(path, err.to_string()))
}
