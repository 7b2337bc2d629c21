// flowgate-mcp/src/tooling/tests.rs
// ============================================================================
// Module: Tool Catalog Unit Tests
// Description: Validates tool names and definition schemas.
// Purpose: Keep the tool listing and argument schemas internally consistent.
// Dependencies: jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Verifies name round-trips and that every definition carries a compilable
//! strict argument schema.

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

use jsonschema::Draft;
use serde_json::Value;
use serde_json::json;

use super::ToolName;
use super::tool_definitions;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn tool_names_round_trip_through_parse() {
    for name in ToolName::all() {
        assert_eq!(ToolName::parse(name.as_str()), Some(*name));
    }
    assert_eq!(ToolName::parse("scenario_define"), None);
    assert_eq!(ToolName::parse("listDeployments"), None);
}

#[test]
fn tool_names_serialize_as_kebab_case() {
    let serialized = serde_json::to_value(ToolName::ListDeployments).unwrap();
    assert_eq!(serialized, json!("list-deployments"));
    let parsed: ToolName = serde_json::from_value(json!("modify-service")).unwrap();
    assert_eq!(parsed, ToolName::ModifyService);
}

#[test]
fn definitions_cover_every_tool_in_canonical_order() {
    let definitions = tool_definitions();
    assert_eq!(definitions.len(), ToolName::all().len());
    for (definition, name) in definitions.iter().zip(ToolName::all()) {
        assert_eq!(definition.name, *name);
        assert!(!definition.description.is_empty());
    }
}

#[test]
fn every_definition_schema_compiles_and_rejects_unknown_arguments() {
    for definition in tool_definitions() {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&definition.input_schema)
            .expect("argument schema compilation failed");
        assert_eq!(
            definition.input_schema.get("additionalProperties"),
            Some(&Value::Bool(false)),
            "schema for {} must be strict",
            definition.name
        );
        assert!(
            !validator.is_valid(&json!({ "surprise": true })),
            "schema for {} accepted an unknown argument",
            definition.name
        );
    }
}

#[test]
fn create_deployment_schema_requires_exactly_one_endpoint() {
    let definition = tool_definitions()
        .into_iter()
        .find(|definition| definition.name == ToolName::CreateDeployment)
        .unwrap();
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&definition.input_schema)
        .unwrap();
    assert!(validator.is_valid(&json!({ "uri": "http://greeter:9080" })));
    assert!(validator.is_valid(&json!({ "arn": "arn:aws:lambda:us-east-1:1:function:g:1" })));
    assert!(!validator.is_valid(&json!({})));
    assert!(!validator.is_valid(&json!({
        "uri": "http://greeter:9080",
        "arn": "arn:aws:lambda:us-east-1:1:function:g:1"
    })));
}

#[test]
fn definitions_expose_camel_case_input_schema_key() {
    let definition = &tool_definitions()[0];
    let serialized = serde_json::to_value(definition).unwrap();
    assert!(serialized.get("inputSchema").is_some());
    assert!(serialized.get("input_schema").is_none());
}
