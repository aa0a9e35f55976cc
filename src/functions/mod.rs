//! Callable functions exposed to the model, and the registry that holds them.

mod registry;
mod tools;

pub use registry::{Function, FunctionRegistry};
pub use tools::{format_functions_for_llm, render_tool_prompt, DEFAULT_TOOL_PROMPT};
