//! Model dispatcher: binds the function registry to a chat model and routes
//! the model's selection to the matching function.
//!
//! Lifecycle of one call: `Idle` → `run` → `Dispatching` → `Completed`, with
//! either the function's output or the not-found message. Nothing carries over
//! between calls.

use crate::api::response::parse_model_message;
use crate::api::{ChatBackend, RequestBody};
use crate::error::{AskDbError, Result};
use crate::functions::{
    format_functions_for_llm, render_tool_prompt, Function, FunctionRegistry, DEFAULT_TOOL_PROMPT,
};
use crate::models::{FunctionCall, Message, ModelMessage};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

pub const NO_MATCHING_FUNCTION: &str = "Error: No matching function found for the given input.";

/// How the function list reaches the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolBinding {
    /// Render the schemas into the system prompt only.
    #[default]
    Prompt,
    /// Also send them in the request's `tools` field.
    Native,
}

/// Which arguments the selected function receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentSource {
    /// `{"input": <original user text>}`, whatever the model produced.
    #[default]
    RawInput,
    /// The model's own arguments, validated against the function schema.
    Model,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub model: String,
    pub prompt_template: Option<String>,
    pub binding: ToolBinding,
    pub arguments: ArgumentSource,
}

impl DispatcherConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt_template: None,
            binding: ToolBinding::default(),
            arguments: ArgumentSource::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed { function: String, output: String },
    ToolNotFound { name: String },
}

impl DispatchOutcome {
    pub fn into_text(self) -> String {
        match self {
            DispatchOutcome::Completed { output, .. } => output,
            DispatchOutcome::ToolNotFound { .. } => NO_MATCHING_FUNCTION.to_string(),
        }
    }
}

pub struct ModelDispatcher {
    backend: Arc<dyn ChatBackend>,
    registry: FunctionRegistry,
    model: String,
    arguments: ArgumentSource,
    system_prompt: String,
    tools: Option<Vec<Value>>,
}

impl ModelDispatcher {
    /// Build the registry and bind it to the model. The binding is fixed for
    /// the lifetime of the dispatcher.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        functions: Vec<Box<dyn Function>>,
        config: DispatcherConfig,
    ) -> Result<Self> {
        let mut registry = FunctionRegistry::new();
        registry.register_all(functions)?;

        let template = config
            .prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_TOOL_PROMPT);
        let system_prompt = render_tool_prompt(template, &registry.to_schema_list());

        let tools = match config.binding {
            ToolBinding::Prompt => None,
            ToolBinding::Native => Some(format_functions_for_llm(&registry)),
        };

        debug!(
            model = %config.model,
            functions = ?registry.names(),
            binding = ?config.binding,
            "Bound functions to model"
        );

        Ok(Self {
            backend,
            registry,
            model: config.model,
            arguments: config.arguments,
            system_prompt,
            tools,
        })
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Send the input to the model with the bound functions.
    pub async fn invoke(&self, input: &str) -> Result<ModelMessage> {
        let request = RequestBody {
            model: self.model.clone(),
            messages: vec![Message::system(&self.system_prompt), Message::user(input)],
            stream: false,
            tools: self.tools.clone(),
        };

        let response = self.backend.chat(&request).await?;
        parse_model_message(&response)
    }

    pub async fn dispatch(&self, input: &str) -> Result<DispatchOutcome> {
        let message = self.invoke(input).await?;
        let call = message
            .function_call
            .ok_or(AskDbError::MissingFunctionCall(message.content))?;

        let Some(function) = self.registry.lookup(&call.name) else {
            warn!(function = %call.name, "Model selected an unknown function");
            return Ok(DispatchOutcome::ToolNotFound { name: call.name });
        };

        let arguments = self.arguments_for(input, &call)?;
        debug!(function = %call.name, arguments = %arguments, "Dispatching");

        let output = function.call(&arguments).await?;
        Ok(DispatchOutcome::Completed {
            function: call.name,
            output,
        })
    }

    /// Dispatch and flatten the outcome to the answer text.
    pub async fn run(&self, input: &str) -> Result<String> {
        Ok(self.dispatch(input).await?.into_text())
    }

    fn arguments_for(&self, input: &str, call: &FunctionCall) -> Result<Value> {
        match self.arguments {
            ArgumentSource::RawInput => Ok(json!({ "input": input })),
            ArgumentSource::Model => {
                self.registry.validate_arguments(&call.name, &call.arguments)?;
                Ok(call.arguments.clone())
            }
        }
    }
}
