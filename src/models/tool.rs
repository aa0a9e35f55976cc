use serde::{Deserialize, Serialize};

/// Native tool call as reported in an OpenAI-compatible `tool_calls` array.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub tool_type: Option<String>,
    pub function: ToolCallFunction,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolCallFunction {
    pub name: String,
    /// JSON-encoded string on OpenAI, a plain object on some local runtimes.
    #[serde(default)]
    pub arguments: serde_json::Value,
}
