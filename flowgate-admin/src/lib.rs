// flowgate-admin/src/lib.rs
// ============================================================================
// Module: Flowgate Admin
// Description: Typed client for the durable runtime administrative HTTP API.
// Purpose: Provide schema-validated admin operations for MCP tooling.
// Dependencies: reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Flowgate Admin wraps the durable runtime's administrative HTTP API in a
//! small set of typed operations. Every operation is a single outbound
//! request: build the target URL, issue the call through
//! [`gateway::AdminGateway`], validate the response through the schema
//! types, and return the validated value. The crate holds no state across
//! calls; the runtime is the sole source of truth for every entity.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod error;
pub mod gateway;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::AdminClient;
pub use client::RegisterDeploymentRequest;
pub use client::ServicePatch;
pub use error::AdminError;
pub use gateway::AdminGateway;
pub use gateway::AdminGatewayConfig;
pub use schema::Deployment;
pub use schema::FunctionDeployment;
pub use schema::Handler;
pub use schema::HandlerType;
pub use schema::HttpDeployment;
pub use schema::InvocationSummary;
pub use schema::Nullable;
pub use schema::ProtocolType;
pub use schema::RegisterDeploymentResponse;
pub use schema::Service;
pub use schema::ServiceRef;
pub use schema::ServiceType;
