//! Deterministic system prompt assembly (C9).
//!
//! [`build_prompt`] concatenates five fixed parts in order; nothing here is
//! randomized or reordered, so the same [`AgentDescriptor`] always produces
//! byte-identical prompt text.

use warden_core::{AgentDescriptor, FieldType, OutputSchema, ToolCatalog};

const FALLBACK_DESCRIPTION: &str =
    "You are an AI agent that executes tasks by generating sandboxed scripting-language code.";

const CODE_EXECUTION_RULES: &str = "\
## Code execution rules

- Code you submit runs in a sandbox with no access to the filesystem, network, or operating system.
- Each evaluation is stateless: variables and state do not persist between evaluations.
- If your code fails, the error message is fed back to you; fix it and try again.
- Code may have side effects through tool calls; do not assume an evaluation is safe to repeat \
  if it already succeeded once.
- Write small, direct expressions. Prefer the standard library modules listed above over \
  reimplementing their behavior.
- Call tool functions using their fully qualified name, e.g. `ModuleName.function_name(args)`.";

/// A single output-field schema that counts as "the default" for the
/// purposes of deciding whether to render a conforming example (§4.9 part
/// 3): one required string field named `value`.
fn is_default_output_schema(schema: &OutputSchema) -> bool {
    matches!(schema.as_slice(), [(name, field)] if name == "value" && field.ty == FieldType::String && field.required)
}

/// Assemble the full system prompt for `agent`.
pub fn build_prompt(agent: &AgentDescriptor, catalog: &dyn ToolCatalog) -> String {
    let mut sections = Vec::new();

    sections.push(description_section(agent));
    sections.push(tool_documentation_section(agent, catalog));
    sections.push(response_format_section(agent));
    sections.push(CODE_EXECUTION_RULES.to_owned());

    if let Some(extra) = &agent.system_prompt_extra {
        if !extra.is_empty() {
            sections.push(extra.clone());
        }
    }

    sections.join("\n\n")
}

fn description_section(agent: &AgentDescriptor) -> String {
    if agent.moduledoc.is_empty() { FALLBACK_DESCRIPTION.to_owned() } else { agent.moduledoc.clone() }
}

fn tool_documentation_section(agent: &AgentDescriptor, catalog: &dyn ToolCatalog) -> String {
    let mut out = String::from("## Available tools\n");
    for tool in &agent.tools {
        let options = agent.tool_options(&tool.name);
        out.push_str(&format!("\n### {}\n\n{}\n", tool.name, tool.effective_description()));
        if let Some(doc) = catalog.dynamic_doc(&tool.name, &options) {
            out.push('\n');
            out.push_str(&doc);
            out.push('\n');
        }
        for function in &tool.functions {
            out.push_str(&format!("- `{}`\n", signature(&tool.name, function.name.as_str(), &function.params)));
            if !function.doc.is_empty() {
                out.push_str(&format!("    {}\n", function.doc));
            }
        }
    }
    out
}

fn signature(module: &str, function: &str, params: &[String]) -> String {
    format!("{module}.{function}({})", params.join(", "))
}

fn response_format_section(agent: &AgentDescriptor) -> String {
    let mut out = String::from(
        "## Response format\n\n\
         Respond with exactly one JSON object with keys `action`, `code`, `result`:\n\n\
         - `{\"action\": \"eval_and_continue\", \"code\": \"<code>\", \"result\": {}}` -- evaluate \
         `code`, feed the result back, and keep going.\n\
         - `{\"action\": \"eval_and_complete\", \"code\": \"<code>\", \"result\": {}}` -- evaluate \
         `code` and stop once it succeeds.\n\
         - `{\"action\": \"return\", \"code\": \"\", \"result\": <final result>}` -- stop immediately \
         with the given result.\n\
         - `{\"action\": \"done\", \"code\": \"\", \"result\": {}}` -- stop immediately with no result.\n",
    );

    if !is_default_output_schema(&agent.output_schema) {
        out.push_str("\nThe `result` field must conform to this example shape:\n\n");
        out.push_str(&example_result_json(&agent.output_schema));
        out.push('\n');
    }

    out
}

fn example_result_json(schema: &OutputSchema) -> String {
    let mut map = serde_json::Map::new();
    for (name, field) in schema {
        map.insert(name.clone(), example_value(&field.ty));
    }
    serde_json::to_string_pretty(&serde_json::Value::Object(map)).unwrap_or_default()
}

fn example_value(ty: &FieldType) -> serde_json::Value {
    match ty {
        FieldType::String => serde_json::json!("string"),
        FieldType::Float => serde_json::json!(0.0),
        FieldType::Integer => serde_json::json!(0),
        FieldType::Boolean => serde_json::json!(false),
        FieldType::List(inner) => serde_json::json!([example_value(inner)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use warden_allowlist::{AllowlistBuilder, ModuleRegistry};
    use warden_core::{AgentDescriptor, FunctionSignature, OutputField, ToolDescriptor};

    struct NoopCatalog;
    impl ToolCatalog for NoopCatalog {
        fn dynamic_doc(&self, _tool_name: &str, _options: &Value) -> Option<String> {
            None
        }
        fn aliases(&self, _tool_name: &str, _options: &Value) -> Vec<(String, String)> {
            Vec::new()
        }
    }

    fn tool() -> ToolDescriptor {
        ToolDescriptor {
            name: "Files".into(),
            moduledoc: "Read-only file access.".into(),
            functions: vec![FunctionSignature { name: "read".into(), arity: 1, doc: "Reads a file.".into(), params: vec!["path".into()] }],
            allowlist_contribution: Default::default(),
            description_override: None,
        }
    }

    #[test]
    fn falls_back_to_default_description_when_moduledoc_empty() {
        let agent = AgentDescriptor::new("", vec![], AllowlistBuilder::new().build(), ModuleRegistry::new());
        let prompt = build_prompt(&agent, &NoopCatalog);
        assert!(prompt.contains(FALLBACK_DESCRIPTION));
    }

    #[test]
    fn uses_moduledoc_when_present() {
        let agent = AgentDescriptor::new("A specialized research agent.", vec![], AllowlistBuilder::new().build(), ModuleRegistry::new());
        let prompt = build_prompt(&agent, &NoopCatalog);
        assert!(prompt.contains("A specialized research agent."));
    }

    #[test]
    fn lists_tool_function_signatures() {
        let agent = AgentDescriptor::new("doc", vec![tool()], AllowlistBuilder::new().build(), ModuleRegistry::new());
        let prompt = build_prompt(&agent, &NoopCatalog);
        assert!(prompt.contains("Files.read(path)"));
        assert!(prompt.contains("Reads a file."));
    }

    #[test]
    fn response_format_enumerates_four_actions() {
        let agent = AgentDescriptor::new("doc", vec![], AllowlistBuilder::new().build(), ModuleRegistry::new());
        let prompt = build_prompt(&agent, &NoopCatalog);
        assert!(prompt.contains("eval_and_continue"));
        assert!(prompt.contains("eval_and_complete"));
        assert!(prompt.contains("\"return\""));
        assert!(prompt.contains("\"done\""));
    }

    #[test]
    fn default_output_schema_omits_conforming_example() {
        let mut agent = AgentDescriptor::new("doc", vec![], AllowlistBuilder::new().build(), ModuleRegistry::new());
        agent.output_schema = vec![("value".into(), OutputField { ty: FieldType::String, required: true })];
        let prompt = build_prompt(&agent, &NoopCatalog);
        assert!(!prompt.contains("must conform to this example shape"));
    }

    #[test]
    fn deviating_output_schema_includes_conforming_example() {
        let mut agent = AgentDescriptor::new("doc", vec![], AllowlistBuilder::new().build(), ModuleRegistry::new());
        agent.output_schema = vec![
            ("summary".into(), OutputField { ty: FieldType::String, required: true }),
            ("score".into(), OutputField { ty: FieldType::Integer, required: false }),
        ];
        let prompt = build_prompt(&agent, &NoopCatalog);
        assert!(prompt.contains("must conform to this example shape"));
        assert!(prompt.contains("\"summary\""));
        assert!(prompt.contains("\"score\""));
    }

    #[test]
    fn custom_instructions_appended_last() {
        let mut agent = AgentDescriptor::new("doc", vec![], AllowlistBuilder::new().build(), ModuleRegistry::new());
        agent.system_prompt_extra = Some("Always respond in French.".into());
        let prompt = build_prompt(&agent, &NoopCatalog);
        assert!(prompt.trim_end().ends_with("Always respond in French."));
    }

    #[test]
    fn dynamic_doc_is_included_when_catalog_provides_one() {
        struct VerboseCatalog;
        impl ToolCatalog for VerboseCatalog {
            fn dynamic_doc(&self, tool_name: &str, _options: &Value) -> Option<String> {
                Some(format!("{tool_name} is currently rate-limited to 10 calls/minute."))
            }
            fn aliases(&self, _tool_name: &str, _options: &Value) -> Vec<(String, String)> {
                Vec::new()
            }
        }
        let agent = AgentDescriptor::new("doc", vec![tool()], AllowlistBuilder::new().build(), ModuleRegistry::new());
        let prompt = build_prompt(&agent, &VerboseCatalog);
        assert!(prompt.contains("rate-limited to 10 calls/minute"));
    }
}
