//! Workflow-tool surface: a self-describing descriptor and an entry point that
//! takes the orchestrator's parameter map.

use crate::config::ConvertOptions;
use crate::core::converter::Converter;
use crate::domain::model::{ConversionResult, Locale};
use crate::utils::error::ConvertError;
use crate::utils::validation::validate_required_field;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const TOOL_NAME: &str = "JSON to Excel converter";
pub const TOOL_DESCRIPTION: &str = "Convert JSON test cases into an Excel or CSV file";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub parameters: Value,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: TOOL_NAME,
        description: TOOL_DESCRIPTION,
        version: env!("CARGO_PKG_VERSION"),
        parameters: json!({
            "type": "object",
            "properties": {
                "json_input": {
                    "type": "string",
                    "description": "JSON test case data, or a path to a JSON file"
                },
                "output_format": {
                    "type": "string",
                    "enum": ["excel", "csv"],
                    "default": "excel",
                    "description": "Output format"
                },
                "include_styling": {
                    "type": "boolean",
                    "default": true,
                    "description": "Style the header row and size columns (Excel only)"
                },
                "filename": {
                    "type": "string",
                    "default": "test_cases",
                    "description": "Output file name without extension"
                },
                "locale": {
                    "type": "string",
                    "enum": ["en", "zh"],
                    "default": "en",
                    "description": "Language of column labels and messages"
                }
            },
            "required": ["json_input"]
        }),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ToolParams {
    #[serde(default)]
    json_input: Option<Value>,
    #[serde(flatten)]
    options: ConvertOptions,
}

/// Runs a conversion from the orchestrator's parameter map.
///
/// `json_input` may be a string (JSON text or file path) or an already-parsed
/// JSON value. Malformed parameters are reported as a failure result.
pub fn execute(params: &Value) -> ConversionResult {
    let params = match ToolParams::deserialize(params) {
        Ok(params) => params,
        Err(e) => {
            tracing::error!("❌ Invalid tool parameters: {}", e);
            return ConversionResult::failure(&ConvertError::from(e), Locale::default());
        }
    };

    let json_input = match validate_required_field("json_input", &params.json_input) {
        Ok(Value::String(text)) => text.clone(),
        Ok(value) => value.to_string(),
        Err(e) => return ConversionResult::failure(&e, params.options.locale),
    };

    Converter::new(params.options).run(&json_input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_lists_parameters() {
        let descriptor = serde_json::to_value(descriptor()).unwrap();

        assert_eq!(descriptor["name"], TOOL_NAME);
        assert_eq!(descriptor["parameters"]["required"], json!(["json_input"]));
        assert_eq!(
            descriptor["parameters"]["properties"]["output_format"]["enum"],
            json!(["excel", "csv"])
        );
    }

    #[test]
    fn test_execute_with_string_input() {
        let result = execute(&json!({
            "json_input": r#"{"cases": [{"id": "C1"}]}"#,
            "output_format": "csv",
            "filename": "smoke"
        }));

        let payload = result.payload().unwrap();
        assert_eq!(payload.filename, "smoke.csv");
        assert!(payload.file_content.contains("C1"));
    }

    #[test]
    fn test_execute_with_inline_document() {
        let result = execute(&json!({
            "json_input": [{"id": "INLINE"}],
            "output_format": "csv"
        }));
        assert!(result.payload().unwrap().file_content.contains("INLINE"));
    }

    #[test]
    fn test_missing_json_input() {
        let result = execute(&json!({"output_format": "csv"}));
        assert_eq!(result.error(), Some("Missing required field: json_input"));
    }

    #[test]
    fn test_unknown_output_format() {
        let result = execute(&json!({"json_input": "[]", "output_format": "pdf"}));
        assert!(!result.is_success());
    }
}
