use super::registry::FunctionRegistry;
use crate::models::FunctionSpec;
use serde_json::{json, Value};

/// System prompt used when no template is configured. `{tools}` is replaced by
/// the JSON schema list; `{{` and `}}` are literal braces.
pub const DEFAULT_TOOL_PROMPT: &str = r#"You have access to the following tools:

{tools}

You must always select one of the above tools and respond with only a JSON object matching the following schema:

{{
  "tool": <name of the selected tool>,
  "tool_input": <parameters for the selected tool, matching the tool's JSON schema>
}}
"#;

/// Tool list in OpenAI function-calling format.
pub fn format_functions_for_llm(registry: &FunctionRegistry) -> Vec<Value> {
    registry
        .to_schema_list()
        .iter()
        .map(|spec| {
            json!({
                "type": "function",
                "function": {
                    "name": spec.name,
                    "description": spec.description,
                    "parameters": spec.parameters.to_json(),
                }
            })
        })
        .collect()
}

/// Fill a tool-selection template with the given function specs.
pub fn render_tool_prompt(template: &str, specs: &[FunctionSpec]) -> String {
    let tools = serde_json::to_string_pretty(specs).unwrap_or_else(|_| "[]".to_string());

    // Split on the placeholder first so braces inside the schema stay intact
    template
        .split("{tools}")
        .map(|part| part.replace("{{", "{").replace("}}", "}"))
        .collect::<Vec<_>>()
        .join(&tools)
}
