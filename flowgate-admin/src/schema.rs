// flowgate-admin/src/schema.rs
// ============================================================================
// Module: Admin Schema Library
// Description: Wire shapes for deployments, services, handlers, invocations.
// Purpose: Validate and normalize runtime payloads at the API boundary.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The schema library declares every shape that crosses the runtime
//! boundary. Deployments arrive without an explicit endpoint-kind tag; the
//! [`Deployment`] deserializer reconstructs the discriminant once, at the
//! validation boundary, so the rest of the crate never re-probes field
//! presence. Timestamps are opaque strings and are never interpreted.
//! Optional-but-nullable fields use [`Nullable`] to keep "not sent"
//! distinct from "sent as null".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as DeError;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Tri-State Fields
// ============================================================================

/// Tri-state carrier for optional-but-nullable wire fields.
///
/// # Invariants
/// - `Absent` is never serialized; pair with
///   `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`.
/// - `Null` round-trips as an explicit JSON null.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Nullable<T> {
    /// Field was not sent.
    #[default]
    Absent,
    /// Field was sent as an explicit null.
    Null,
    /// Field was sent with a value.
    Value(T),
}

impl<T> Nullable<T> {
    /// Returns true when the field was not sent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the contained value, if any.
    #[must_use]
    pub const fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent | Self::Null => serializer.serialize_none(),
            Self::Value(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|opt| opt.map_or(Self::Null, Self::Value))
    }
}

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Protocol variant for HTTP deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolType {
    /// One request, one response per invocation.
    RequestResponse,
    /// Bidirectional streaming connection.
    BidiStream,
}

/// Service kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    /// Stateless service.
    Service,
    /// Exclusive-state keyed object.
    VirtualObject,
    /// Run-once workflow.
    Workflow,
}

/// Handler concurrency mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerType {
    /// Exclusive access to the object key.
    Exclusive,
    /// Shared read access to the object key.
    Shared,
    /// Workflow run handler.
    Workflow,
}

// ============================================================================
// SECTION: Deployments
// ============================================================================

/// Service name and revision pair hosted by a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    /// Service name.
    pub name: String,
    /// Service revision.
    pub revision: u64,
}

/// Deployment backed by an HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpDeployment {
    /// Deployment identifier.
    pub id: String,
    /// Services hosted at this deployment revision.
    #[serde(default)]
    pub services: Vec<ServiceRef>,
    /// Endpoint URI.
    pub uri: String,
    /// Protocol variant used by the endpoint.
    pub protocol_type: ProtocolType,
    /// Minimum supported service protocol version.
    pub min_protocol_version: i32,
    /// Maximum supported service protocol version.
    pub max_protocol_version: i32,
    /// Creation timestamp (opaque, not interpreted).
    pub created_at: String,
    /// Extra headers attached to runtime-to-service requests.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub additional_headers: Nullable<BTreeMap<String, String>>,
}

/// Deployment backed by a remote function endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeployment {
    /// Deployment identifier.
    pub id: String,
    /// Services hosted at this deployment revision.
    #[serde(default)]
    pub services: Vec<ServiceRef>,
    /// Remote function identifier.
    pub arn: String,
    /// Role assumed when invoking the function.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub assume_role_arn: Nullable<String>,
    /// Minimum supported service protocol version.
    pub min_protocol_version: i32,
    /// Maximum supported service protocol version.
    pub max_protocol_version: i32,
    /// Creation timestamp (opaque, not interpreted).
    pub created_at: String,
}

/// Deployment with the endpoint-kind discriminant reconstructed.
///
/// # Invariants
/// - Exactly one endpoint kind's fields are populated. The wire format
///   carries no tag; `uri` selects [`Deployment::Http`] and `arn` selects
///   [`Deployment::Function`]. Both or neither is a validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Deployment {
    /// HTTP endpoint deployment.
    Http(HttpDeployment),
    /// Remote function deployment.
    Function(FunctionDeployment),
}

impl Deployment {
    /// Returns the deployment identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Http(http) => &http.id,
            Self::Function(function) => &function.id,
        }
    }

    /// Returns the services hosted by this deployment.
    #[must_use]
    pub const fn services(&self) -> &Vec<ServiceRef> {
        match self {
            Self::Http(http) => &http.services,
            Self::Function(function) => &function.services,
        }
    }
}

/// Untagged deployment fields as received from the runtime.
#[derive(Deserialize)]
struct RawDeployment {
    /// Deployment identifier.
    id: String,
    /// Services hosted at this deployment revision.
    #[serde(default)]
    services: Vec<ServiceRef>,
    /// Endpoint URI when the deployment is HTTP-backed.
    #[serde(default)]
    uri: Option<String>,
    /// Protocol variant when the deployment is HTTP-backed.
    #[serde(default)]
    protocol_type: Option<ProtocolType>,
    /// Function identifier when the deployment is function-backed.
    #[serde(default)]
    arn: Option<String>,
    /// Assumed role when the deployment is function-backed.
    #[serde(default)]
    assume_role_arn: Nullable<String>,
    /// Minimum supported service protocol version.
    min_protocol_version: i32,
    /// Maximum supported service protocol version.
    max_protocol_version: i32,
    /// Creation timestamp.
    created_at: String,
    /// Extra headers for HTTP-backed deployments.
    #[serde(default)]
    additional_headers: Nullable<BTreeMap<String, String>>,
}

impl RawDeployment {
    /// Selects the endpoint-kind branch from field presence.
    fn into_deployment(self) -> Result<Deployment, String> {
        match (self.uri, self.arn) {
            (Some(uri), None) => {
                let protocol_type = self.protocol_type.ok_or_else(|| {
                    "protocol_type: required for http deployments".to_string()
                })?;
                Ok(Deployment::Http(HttpDeployment {
                    id: self.id,
                    services: self.services,
                    uri,
                    protocol_type,
                    min_protocol_version: self.min_protocol_version,
                    max_protocol_version: self.max_protocol_version,
                    created_at: self.created_at,
                    additional_headers: self.additional_headers,
                }))
            }
            (None, Some(arn)) => Ok(Deployment::Function(FunctionDeployment {
                id: self.id,
                services: self.services,
                arn,
                assume_role_arn: self.assume_role_arn,
                min_protocol_version: self.min_protocol_version,
                max_protocol_version: self.max_protocol_version,
                created_at: self.created_at,
            })),
            (Some(_), Some(_)) => {
                Err("deployment matches both endpoint kinds: uri and arn are mutually exclusive"
                    .to_string())
            }
            (None, None) => {
                Err("deployment matches no endpoint kind: one of uri or arn is required"
                    .to_string())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Deployment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDeployment::deserialize(deserializer)?;
        raw.into_deployment().map_err(D::Error::custom)
    }
}

// ============================================================================
// SECTION: Services and Handlers
// ============================================================================

/// Named entry point on a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handler {
    /// Handler name.
    pub name: String,
    /// Concurrency mode; stateless services may omit it.
    #[serde(default)]
    pub ty: Option<HandlerType>,
    /// Handler documentation.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub documentation: Nullable<String>,
    /// Human-readable input description.
    #[serde(default)]
    pub input_description: String,
    /// Human-readable output description.
    #[serde(default)]
    pub output_description: String,
    /// Machine-readable input schema when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_json_schema: Option<Value>,
    /// Machine-readable output schema when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_json_schema: Option<Value>,
}

/// Named unit of invocable logic at one deployment revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Handlers exposed by the service, in declaration order.
    #[serde(default)]
    pub handlers: Vec<Handler>,
    /// Service kind.
    pub ty: ServiceType,
    /// Owning deployment identifier.
    pub deployment_id: String,
    /// Revision number.
    pub revision: u64,
    /// Whether the service is reachable through the public ingress.
    pub public: bool,
    /// Idempotency key retention duration.
    pub idempotency_retention: String,
    /// Workflow completion retention; stateful kinds only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_completion_retention: Option<String>,
    /// Inactivity timeout; stateful kinds only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactivity_timeout: Option<String>,
    /// Abort timeout; stateful kinds only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_timeout: Option<String>,
    /// Service documentation.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub documentation: Nullable<String>,
    /// Service metadata map.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub metadata: Nullable<BTreeMap<String, String>>,
}

// ============================================================================
// SECTION: Response Envelopes
// ============================================================================

/// Envelope for the deployment collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDeploymentsResponse {
    /// Registered deployments.
    pub deployments: Vec<Deployment>,
}

/// Envelope for the service collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListServicesResponse {
    /// Registered services.
    pub services: Vec<Service>,
}

/// Result of registering a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDeploymentResponse {
    /// Assigned deployment identifier.
    pub id: String,
    /// Services discovered at the endpoint.
    #[serde(default)]
    pub services: Vec<ServiceRef>,
}

// ============================================================================
// SECTION: Invocation Projection
// ============================================================================

/// Minimal invocation projection built from introspection rows.
///
/// # Invariants
/// - Construction never fails: introspection rows are schemaless at the
///   edge, so missing columns substitute fallbacks instead of erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationSummary {
    /// Invocation identifier.
    pub id: String,
    /// Target service name.
    pub target_service: String,
    /// Target handler name.
    pub target_handler: String,
    /// Target key for keyed services.
    pub target_key: Option<String>,
    /// Lifecycle status as reported by the runtime.
    pub status: String,
    /// Creation timestamp; current time when the column is missing.
    pub created_at: String,
    /// Completion timestamp, when present.
    pub completed_at: Option<String>,
    /// Last recorded failure message, when present.
    pub last_failure: Option<String>,
}

impl InvocationSummary {
    /// Projects one introspection row, substituting safe fallbacks for
    /// missing columns.
    #[must_use]
    pub fn from_row(row: &Value) -> Self {
        Self {
            id: row_string(row, "id"),
            target_service: row_string(row, "target_service_name"),
            target_handler: row_string(row, "target_handler_name"),
            target_key: row_opt_string(row, "target_key"),
            status: row_string(row, "status"),
            created_at: row
                .get("created_at")
                .and_then(Value::as_str)
                .map_or_else(now_rfc3339, str::to_string),
            completed_at: row_opt_string(row, "completed_at"),
            last_failure: row_opt_string(row, "last_failure"),
        }
    }
}

/// Reads a string column, substituting the empty string when missing.
fn row_string(row: &Value, column: &str) -> String {
    row.get(column).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Reads an optional string column, substituting null when missing.
fn row_opt_string(row: &Value, column: &str) -> Option<String> {
    row.get(column).and_then(Value::as_str).map(str::to_string)
}

/// Returns the current time as an RFC 3339 string.
fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}
