//! Declarative JSON schema builder constraining LLM replies to the four
//! structured action variants.

use serde_json::{Value, json};
use warden_core::{FieldType, OutputSchema};

/// Build the strict action-reply schema for `output_schema`.
pub fn build_action_schema(output_schema: &OutputSchema) -> Value {
    json!({
        "type": "object",
        "properties": {
            "action": { "enum": ["eval_and_continue", "eval_and_complete", "return", "done"] },
            "code": { "type": "string" },
            "result": build_result_schema(output_schema),
        },
        "required": ["action", "code", "result"],
        "additionalProperties": false,
    })
}

/// Build the `result` object schema derived from an agent's `output_schema`.
fn build_result_schema(output_schema: &OutputSchema) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for (field, def) in output_schema {
        properties.insert(field.clone(), field_type_schema(&def.ty));
        if def.required {
            required.push(Value::String(field.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
        "additionalProperties": false,
    })
}

fn field_type_schema(ty: &FieldType) -> Value {
    match ty {
        FieldType::String => json!({ "type": "string" }),
        FieldType::Float => json!({ "type": "number" }),
        FieldType::Integer => json!({ "type": "integer" }),
        FieldType::Boolean => json!({ "type": "boolean" }),
        FieldType::List(inner) => json!({ "type": "array", "items": field_type_schema(inner) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::OutputField;

    #[test]
    fn empty_output_schema_yields_empty_result_object() {
        let schema = build_action_schema(&OutputSchema::new());
        assert_eq!(schema["properties"]["result"]["properties"], json!({}));
        assert_eq!(schema["properties"]["result"]["required"], json!([]));
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn action_enum_has_all_four_variants() {
        let schema = build_action_schema(&OutputSchema::new());
        let variants = schema["properties"]["action"]["enum"].as_array().unwrap();
        assert_eq!(variants.len(), 4);
        assert!(variants.contains(&json!("eval_and_continue")));
        assert!(variants.contains(&json!("eval_and_complete")));
        assert!(variants.contains(&json!("return")));
        assert!(variants.contains(&json!("done")));
    }

    #[test]
    fn code_and_result_are_always_required() {
        let schema = build_action_schema(&OutputSchema::new());
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("action")));
        assert!(required.contains(&json!("code")));
        assert!(required.contains(&json!("result")));
    }

    #[test]
    fn maps_primitive_field_types() {
        let output_schema: OutputSchema = vec![
            ("name".into(), OutputField { ty: FieldType::String, required: true }),
            ("score".into(), OutputField { ty: FieldType::Float, required: false }),
            ("count".into(), OutputField { ty: FieldType::Integer, required: true }),
            ("done".into(), OutputField { ty: FieldType::Boolean, required: false }),
        ];
        let schema = build_action_schema(&output_schema);
        let result = &schema["properties"]["result"];
        assert_eq!(result["properties"]["name"], json!({ "type": "string" }));
        assert_eq!(result["properties"]["score"], json!({ "type": "number" }));
        assert_eq!(result["properties"]["count"], json!({ "type": "integer" }));
        assert_eq!(result["properties"]["done"], json!({ "type": "boolean" }));
        let required = result["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
    }

    #[test]
    fn maps_list_field_types_recursively() {
        let output_schema: OutputSchema =
            vec![("tags".into(), OutputField { ty: FieldType::List(Box::new(FieldType::String)), required: true })];
        let schema = build_action_schema(&output_schema);
        let tags = &schema["properties"]["result"]["properties"]["tags"];
        assert_eq!(tags["type"], json!("array"));
        assert_eq!(tags["items"], json!({ "type": "string" }));
    }

    #[test]
    fn nested_lists_map_recursively() {
        let output_schema: OutputSchema = vec![(
            "matrix".into(),
            OutputField { ty: FieldType::List(Box::new(FieldType::List(Box::new(FieldType::Integer)))), required: true },
        )];
        let schema = build_action_schema(&output_schema);
        let matrix = &schema["properties"]["result"]["properties"]["matrix"];
        assert_eq!(matrix["items"]["type"], json!("array"));
        assert_eq!(matrix["items"]["items"], json!({ "type": "integer" }));
    }

    #[test]
    fn result_schema_rejects_additional_properties() {
        let schema = build_action_schema(&OutputSchema::new());
        assert_eq!(schema["properties"]["result"]["additionalProperties"], json!(false));
    }
}
