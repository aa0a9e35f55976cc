use crate::error::{AskDbError, Result};
use crate::models::{FunctionCall, ModelMessage, ToolCall};
use serde_json::Value;

fn first_message(response_json: &Value) -> Result<&Value> {
    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| AskDbError::Other("No choices in response".to_string()))?;

    let first_choice = choices
        .first()
        .ok_or_else(|| AskDbError::Other("Empty choices array".to_string()))?;

    first_choice
        .get("message")
        .ok_or_else(|| AskDbError::Other("No message in response".to_string()))
}

/// Parse the native `tool_calls` array, if the response carries a non-empty one.
pub fn parse_tool_calls(response_json: &Value) -> Result<Option<Vec<ToolCall>>> {
    let message = first_message(response_json)?;

    match message.get("tool_calls") {
        Some(Value::Array(calls)) if !calls.is_empty() => {
            let calls = calls
                .iter()
                .map(|c| serde_json::from_value(c.clone()))
                .collect::<std::result::Result<Vec<ToolCall>, _>>()?;
            Ok(Some(calls))
        }
        _ => Ok(None),
    }
}

/// Extract the assistant's text content.
pub fn extract_content(response_json: &Value) -> Result<Option<String>> {
    let message = first_message(response_json)?;

    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .map(|s| s.to_string()))
}

/// Reduce a response to its text and the function the model selected.
///
/// Native `tool_calls` win; otherwise the content is read as a
/// `{"tool": ..., "tool_input": ...}` object.
pub fn parse_model_message(response_json: &Value) -> Result<ModelMessage> {
    let content = extract_content(response_json)?.unwrap_or_default();

    let native = parse_tool_calls(response_json)?
        .and_then(|calls| calls.into_iter().next())
        .map(|call| FunctionCall {
            name: call.function.name,
            arguments: decode_arguments(call.function.arguments),
        });

    let function_call = native.or_else(|| parse_function_call_from_content(&content));

    Ok(ModelMessage {
        content,
        function_call,
    })
}

fn decode_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}

/// Find a tool selection written as JSON inside free text.
pub fn parse_function_call_from_content(content: &str) -> Option<FunctionCall> {
    let object = parse_json_object(content)?;

    let name = object
        .get("tool")
        .or_else(|| object.get("name"))
        .and_then(|n| n.as_str())?
        .to_string();

    let arguments = object
        .get("tool_input")
        .or_else(|| object.get("arguments"))
        .cloned()
        .map(decode_arguments)
        .unwrap_or_else(|| Value::Object(Default::default()));

    Some(FunctionCall { name, arguments })
}

fn parse_json_object(content: &str) -> Option<serde_json::Map<String, Value>> {
    let trimmed = content.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Some(map);
    }

    // Models like to wrap the object in prose or a ```json fence
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_string_arguments() {
        assert_eq!(
            decode_arguments(json!("{\"input\": \"x\"}")),
            json!({"input": "x"})
        );
        assert_eq!(decode_arguments(json!("not json")), json!("not json"));
        assert_eq!(decode_arguments(Value::Null), json!({}));
    }

    #[test]
    fn test_content_with_fence_and_prose() {
        let content = "Sure!\n```json\n{\"tool\": \"query_schema\", \"tool_input\": {\"input\": \"hi\"}}\n```";
        let call = parse_function_call_from_content(content).unwrap();
        assert_eq!(call.name, "query_schema");
        assert_eq!(call.arguments, json!({"input": "hi"}));
    }

    #[test]
    fn test_content_without_tool_key() {
        assert!(parse_function_call_from_content("{\"answer\": 42}").is_none());
        assert!(parse_function_call_from_content("no json here").is_none());
        assert!(parse_function_call_from_content("} {").is_none());
    }
}
