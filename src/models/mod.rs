mod function;
mod message;
mod tool;

pub use function::{FunctionSpec, ParameterSchema};
pub use message::{FunctionCall, Message, ModelMessage};
pub use tool::{ToolCall, ToolCallFunction};
