//! Minimal JSON-schema validation for tool arguments.
//!
//! Checks the subset tools actually declare: object shape, required keys,
//! and primitive property types. Anything deeper is the tool's own problem.

use crate::error::ToolError;
use serde_json::Value;

/// Validate arguments against a tool's declared schema.
pub fn validate_args(tool: &str, schema: &Value, args: &Value) -> Result<(), ToolError> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Ok(());
    }
    let Some(object) = args.as_object() else {
        return Err(invalid(tool, "arguments must be a JSON object"));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(key) {
                return Err(invalid(tool, &format!("missing required argument: {key}")));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, value) in object {
            let Some(declared) = properties.get(key) else {
                continue;
            };
            let Some(expected) = declared.get("type").and_then(Value::as_str) else {
                continue;
            };
            if !type_matches(expected, value) {
                return Err(invalid(
                    tool,
                    &format!("argument {key} should be of type {expected}"),
                ));
            }
        }
    }
    Ok(())
}

/// Whether a value satisfies a primitive schema type name.
fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn invalid(tool: &str, message: &str) -> ToolError {
    ToolError::InvalidArgs {
        tool: tool.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_args;
    use crate::error::ToolError;
    use serde_json::json;

    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string"},
                "count": {"type": "integer"}
            },
            "required": ["text"]
        })
    }

    #[test]
    fn accepts_conforming_arguments() {
        let args = json!({"text": "ping", "count": 2});
        assert!(validate_args("echo", &schema(), &args).is_ok());
    }

    #[test]
    fn rejects_missing_required_key() {
        let err = validate_args("echo", &schema(), &json!({"count": 2})).expect_err("missing");
        match err {
            ToolError::InvalidArgs { message, .. } => assert!(message.contains("text")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_type() {
        let err =
            validate_args("echo", &schema(), &json!({"text": 7})).expect_err("wrong type");
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn rejects_non_object_arguments() {
        assert!(validate_args("echo", &schema(), &json!("ping")).is_err());
    }

    #[test]
    fn unknown_extra_keys_pass_through() {
        let args = json!({"text": "ping", "verbose": true});
        assert!(validate_args("echo", &schema(), &args).is_ok());
    }
}
