// flowgate-mcp/src/tools.rs
// ============================================================================
// Module: Tool Router
// Description: Tool routing for the admin shim MCP server.
// Purpose: Expose thin wrappers over the runtime admin API.
// Dependencies: flowgate-admin, jsonschema, serde, serde_json
// ============================================================================

//! ## Overview
//! The tool router dispatches tool calls to the admin API client. All tool
//! handlers are thin wrappers over [`flowgate_admin::AdminClient`]: validate
//! arguments against the tool's declared schema, issue exactly one admin API
//! call, and render the result as a text payload.
//!
//! ## Invariants
//! - Arguments are validated against the declared schema before any admin
//!   API traffic occurs.
//! - Each tool call issues at most one outbound HTTP request.
//! - Handlers hold no mutable state; concurrent calls need no coordination.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use flowgate_admin::AdminClient;
use flowgate_admin::AdminError;
use flowgate_admin::RegisterDeploymentRequest;
use flowgate_admin::ServicePatch;
use jsonschema::Draft;
use jsonschema::Validator;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::tooling::ToolDefinition;
use crate::tooling::ToolName;
use crate::tooling::tool_definitions;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing error.
///
/// # Invariants
/// - Variants are stable for JSON-RPC error code classification.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name not recognized.
    #[error("unknown tool")]
    UnknownTool,
    /// Tool arguments failed schema or shape validation.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// Admin API call failed.
    #[error(transparent)]
    Admin(#[from] AdminError),
    /// Tool payload serialization failed.
    #[error("serialization failure")]
    Serialization,
}

// ============================================================================
// SECTION: Tool Router
// ============================================================================

/// Tool router for admin shim requests.
pub struct ToolRouter {
    /// Admin API client issuing the outbound requests.
    client: AdminClient,
    /// Compiled argument validators, one per tool.
    validators: BTreeMap<ToolName, Validator>,
}

impl ToolRouter {
    /// Creates a tool router, compiling every argument schema up front.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when an argument schema fails to compile.
    pub fn new(client: AdminClient) -> Result<Self, ToolError> {
        let mut validators = BTreeMap::new();
        for definition in tool_definitions() {
            let validator = jsonschema::options()
                .with_draft(Draft::Draft202012)
                .build(&definition.input_schema)
                .map_err(|err| {
                    ToolError::InvalidParams(format!(
                        "argument schema for {} is invalid: {err}",
                        definition.name
                    ))
                })?;
            validators.insert(definition.name, validator);
        }
        Ok(Self {
            client,
            validators,
        })
    }

    /// Lists the tool definitions exposed by this router.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Handles a tool call by name with JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool is unknown, the arguments fail
    /// validation, or the admin API call fails.
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        let tool = ToolName::parse(name).ok_or(ToolError::UnknownTool)?;
        self.validate_arguments(tool, &arguments)?;
        match tool {
            ToolName::ListDeployments => self.handle_list_deployments().await,
            ToolName::GetDeployment => self.handle_get_deployment(arguments).await,
            ToolName::CreateDeployment => self.handle_create_deployment(arguments).await,
            ToolName::DeleteDeployment => self.handle_delete_deployment(arguments).await,
            ToolName::ListServices => self.handle_list_services().await,
            ToolName::GetService => self.handle_get_service(arguments).await,
            ToolName::ModifyService => self.handle_modify_service(arguments).await,
            ToolName::ListInvocations => self.handle_list_invocations().await,
            ToolName::Query => self.handle_query(arguments).await,
        }
    }

    /// Validates tool arguments against the compiled schema for the tool.
    fn validate_arguments(&self, tool: ToolName, arguments: &Value) -> Result<(), ToolError> {
        let Some(validator) = self.validators.get(&tool) else {
            return Err(ToolError::UnknownTool);
        };
        let messages: Vec<String> =
            validator.iter_errors(arguments).map(|err| err.to_string()).collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ToolError::InvalidParams(messages.join("; ")))
        }
    }

    /// Handles `list-deployments` tool requests.
    async fn handle_list_deployments(&self) -> Result<String, ToolError> {
        let deployments = self.client.list_deployments().await?;
        render(&deployments)
    }

    /// Handles `get-deployment` tool requests.
    async fn handle_get_deployment(&self, arguments: Value) -> Result<String, ToolError> {
        let request = decode::<GetDeploymentArgs>(arguments)?;
        let deployment = self.client.get_deployment(&request.deployment_id).await?;
        render(&deployment)
    }

    /// Handles `create-deployment` tool requests.
    async fn handle_create_deployment(&self, arguments: Value) -> Result<String, ToolError> {
        let request = decode::<CreateDeploymentArgs>(arguments)?;
        let response = self.client.create_deployment(&request.into_register_request()).await?;
        render(&response)
    }

    /// Handles `delete-deployment` tool requests.
    async fn handle_delete_deployment(&self, arguments: Value) -> Result<String, ToolError> {
        let request = decode::<DeleteDeploymentArgs>(arguments)?;
        let force = request.force.unwrap_or(true);
        self.client.delete_deployment(&request.deployment_id, force).await?;
        Ok(format!("Successfully deleted deployment: {}", request.deployment_id))
    }

    /// Handles `list-services` tool requests.
    async fn handle_list_services(&self) -> Result<String, ToolError> {
        let services = self.client.list_services().await?;
        render(&services)
    }

    /// Handles `get-service` tool requests.
    async fn handle_get_service(&self, arguments: Value) -> Result<String, ToolError> {
        let request = decode::<GetServiceArgs>(arguments)?;
        let service = self.client.get_service(&request.service_name).await?;
        render(&service)
    }

    /// Handles `modify-service` tool requests.
    async fn handle_modify_service(&self, arguments: Value) -> Result<String, ToolError> {
        let request = decode::<ModifyServiceArgs>(arguments)?;
        let patch = ServicePatch {
            public: request.is_public,
            idempotency_retention: request.idempotency_retention,
        };
        let service = self.client.modify_service(&request.service_name, &patch).await?;
        render(&service)
    }

    /// Handles `list-invocations` tool requests.
    async fn handle_list_invocations(&self) -> Result<String, ToolError> {
        let invocations = self.client.list_invocations().await?;
        render(&json!({ "invocations": invocations }))
    }

    /// Handles `query` tool requests.
    async fn handle_query(&self, arguments: Value) -> Result<String, ToolError> {
        let request = decode::<QueryArgs>(arguments)?;
        let result = self.client.run_query(&request.query).await?;
        render(&result)
    }
}

// ============================================================================
// SECTION: Tool Argument Shapes
// ============================================================================

/// Arguments for `get-deployment`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GetDeploymentArgs {
    /// Deployment identifier to fetch.
    deployment_id: String,
}

/// Arguments for `create-deployment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateDeploymentArgs {
    /// HTTP endpoint URI.
    #[serde(default)]
    uri: Option<String>,
    /// Remote function identifier.
    #[serde(default)]
    arn: Option<String>,
    /// Role assumed when invoking a remote function.
    #[serde(default)]
    assume_role_arn: Option<String>,
    /// Extra headers attached to runtime-to-endpoint requests.
    #[serde(default)]
    additional_headers: Option<BTreeMap<String, String>>,
    /// Force HTTP/1.1 instead of negotiating HTTP/2.
    #[serde(default)]
    use_http_11: Option<bool>,
    /// Overwrite an existing deployment at the same endpoint.
    #[serde(default)]
    force: Option<bool>,
    /// Discover without registering.
    #[serde(default)]
    dry_run: Option<bool>,
}

impl CreateDeploymentArgs {
    /// Converts tool arguments into the admin API registration body.
    fn into_register_request(self) -> RegisterDeploymentRequest {
        RegisterDeploymentRequest {
            uri: self.uri,
            arn: self.arn,
            assume_role_arn: self.assume_role_arn,
            additional_headers: self.additional_headers,
            use_http_11: self.use_http_11,
            force: self.force,
            dry_run: self.dry_run,
        }
    }
}

/// Arguments for `delete-deployment`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DeleteDeploymentArgs {
    /// Deployment identifier to remove.
    deployment_id: String,
    /// Force removal of an active deployment. Defaults to true.
    #[serde(default)]
    force: Option<bool>,
}

/// Arguments for `get-service`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GetServiceArgs {
    /// Registered service name.
    service_name: String,
}

/// Arguments for `modify-service`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ModifyServiceArgs {
    /// Registered service name.
    service_name: String,
    /// New public-visibility flag.
    #[serde(default)]
    is_public: Option<bool>,
    /// New idempotency retention duration.
    #[serde(default)]
    idempotency_retention: Option<String>,
}

/// Arguments for `query`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct QueryArgs {
    /// SQL text to execute against the introspection tables.
    query: String,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes tool arguments into a typed request shape.
fn decode<T: for<'de> Deserialize<'de>>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|err| ToolError::InvalidParams(err.to_string()))
}

/// Renders an admin API result as a pretty-printed JSON text payload.
fn render<T: Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|_| ToolError::Serialization)
}

#[cfg(test)]
mod tests;
