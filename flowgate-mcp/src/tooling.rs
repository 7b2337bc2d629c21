// flowgate-mcp/src/tooling.rs
// ============================================================================
// Module: Tool Catalog
// Description: Canonical tool identifiers and definitions for the admin shim.
// Purpose: Drive tools/list responses and argument validation schemas.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Canonical tool identifiers and definitions for the admin tool surface.
//! Each definition carries a Draft 2020-12 input schema with
//! `additionalProperties: false` so unknown arguments are rejected before any
//! admin API traffic occurs. Tool names and argument names are part of the
//! external contract surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Tool Names
// ============================================================================

/// Canonical tool names for the admin shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolName {
    /// List all registered deployments.
    ListDeployments,
    /// Fetch a single deployment by identifier.
    GetDeployment,
    /// Register a new deployment with the runtime.
    CreateDeployment,
    /// Remove a deployment from the runtime.
    DeleteDeployment,
    /// List all registered services.
    ListServices,
    /// Fetch a single service by name.
    GetService,
    /// Patch mutable service settings.
    ModifyService,
    /// List currently running invocations.
    ListInvocations,
    /// Run a read-only introspection SQL query.
    Query,
}

impl ToolName {
    /// Returns the canonical string name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListDeployments => "list-deployments",
            Self::GetDeployment => "get-deployment",
            Self::CreateDeployment => "create-deployment",
            Self::DeleteDeployment => "delete-deployment",
            Self::ListServices => "list-services",
            Self::GetService => "get-service",
            Self::ModifyService => "modify-service",
            Self::ListInvocations => "list-invocations",
            Self::Query => "query",
        }
    }

    /// Returns all tool names in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ListDeployments,
            Self::GetDeployment,
            Self::CreateDeployment,
            Self::DeleteDeployment,
            Self::ListServices,
            Self::GetService,
            Self::ModifyService,
            Self::ListInvocations,
            Self::Query,
        ]
    }

    /// Parses a tool name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "list-deployments" => Some(Self::ListDeployments),
            "get-deployment" => Some(Self::GetDeployment),
            "create-deployment" => Some(Self::CreateDeployment),
            "delete-deployment" => Some(Self::DeleteDeployment),
            "list-services" => Some(Self::ListServices),
            "get-service" => Some(Self::GetService),
            "modify-service" => Some(Self::ModifyService),
            "list-invocations" => Some(Self::ListInvocations),
            "query" => Some(Self::Query),
            _ => None,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tool Definitions
// ============================================================================

/// Tool definition used by tools/list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Returns the canonical tool definitions.
///
/// The order is intentional and matches [`ToolName::all`]; clients rely on a
/// stable listing order across releases.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        list_deployments_definition(),
        get_deployment_definition(),
        create_deployment_definition(),
        delete_deployment_definition(),
        list_services_definition(),
        get_service_definition(),
        modify_service_definition(),
        list_invocations_definition(),
        query_definition(),
    ]
}

/// Builds the tool definition for `list-deployments`.
fn list_deployments_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::ListDeployments,
        description: "List all deployments registered with the runtime, including their \
                      endpoints and the services each one serves."
            .to_string(),
        input_schema: empty_object_schema(),
    }
}

/// Builds the tool definition for `get-deployment`.
fn get_deployment_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::GetDeployment,
        description: "Fetch full details for a single deployment by its identifier.".to_string(),
        input_schema: json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "deploymentId": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Deployment identifier, e.g. dp_11abcdef."
                }
            },
            "required": ["deploymentId"],
            "additionalProperties": false
        }),
    }
}

/// Builds the tool definition for `create-deployment`.
fn create_deployment_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::CreateDeployment,
        description: "Register a new deployment with the runtime. Exactly one of uri (HTTP \
                      endpoint) or arn (Lambda endpoint) must be supplied."
            .to_string(),
        input_schema: json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "uri": {
                    "type": "string",
                    "minLength": 1,
                    "description": "HTTP endpoint URI serving the deployment."
                },
                "arn": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Lambda function ARN serving the deployment."
                },
                "assumeRoleArn": {
                    "type": "string",
                    "description": "Optional IAM role to assume when invoking a Lambda endpoint."
                },
                "additionalHeaders": {
                    "type": "object",
                    "additionalProperties": { "type": "string" },
                    "description": "Extra headers attached to runtime-to-endpoint requests."
                },
                "useHttp11": {
                    "type": "boolean",
                    "description": "Force HTTP/1.1 instead of HTTP/2 for the endpoint."
                },
                "force": {
                    "type": "boolean",
                    "description": "Overwrite an existing deployment at the same endpoint."
                },
                "dryRun": {
                    "type": "boolean",
                    "description": "Discover the endpoint without registering it."
                }
            },
            "oneOf": [
                { "required": ["uri"] },
                { "required": ["arn"] }
            ],
            "additionalProperties": false
        }),
    }
}

/// Builds the tool definition for `delete-deployment`.
fn delete_deployment_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::DeleteDeployment,
        description: "Remove a deployment from the runtime. Forced removal is the default; the \
                      runtime rejects unforced removal of active deployments."
            .to_string(),
        input_schema: json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "deploymentId": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Deployment identifier to remove."
                },
                "force": {
                    "type": "boolean",
                    "description": "Force removal even if the deployment is active. Defaults to true."
                }
            },
            "required": ["deploymentId"],
            "additionalProperties": false
        }),
    }
}

/// Builds the tool definition for `list-services`.
fn list_services_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::ListServices,
        description: "List all services registered with the runtime, including handlers and \
                      retention settings."
            .to_string(),
        input_schema: empty_object_schema(),
    }
}

/// Builds the tool definition for `get-service`.
fn get_service_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::GetService,
        description: "Fetch full details for a single service by name.".to_string(),
        input_schema: json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "serviceName": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Registered service name."
                }
            },
            "required": ["serviceName"],
            "additionalProperties": false
        }),
    }
}

/// Builds the tool definition for `modify-service`.
fn modify_service_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::ModifyService,
        description: "Patch mutable service settings. Only supplied fields change; omitted \
                      fields keep their current values."
            .to_string(),
        input_schema: json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "serviceName": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Registered service name."
                },
                "isPublic": {
                    "type": "boolean",
                    "description": "Whether the service accepts ingress requests."
                },
                "idempotencyRetention": {
                    "type": "string",
                    "description": "Retention window for idempotent request results, e.g. 1day."
                }
            },
            "required": ["serviceName"],
            "additionalProperties": false
        }),
    }
}

/// Builds the tool definition for `list-invocations`.
fn list_invocations_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::ListInvocations,
        description: "List currently running invocations with their targets, status, and \
                      failure details."
            .to_string(),
        input_schema: empty_object_schema(),
    }
}

/// Builds the tool definition for `query`.
fn query_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Query,
        description: "Run a read-only SQL query against the runtime introspection tables, e.g. \
                      sys_invocation or sys_service."
            .to_string(),
        input_schema: json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "SQL text to execute against the introspection tables."
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    }
}

/// Builds the argument schema for tools that accept no arguments.
fn empty_object_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests;
