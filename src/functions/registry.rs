use crate::error::{AskDbError, Result};
use crate::models::FunctionSpec;
use async_trait::async_trait;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::debug;

/// A capability the model may select.
#[async_trait]
pub trait Function: Send + Sync {
    fn spec(&self) -> &FunctionSpec;

    fn name(&self) -> &str {
        &self.spec().name
    }

    async fn call(&self, arguments: &Value) -> Result<String>;
}

/// Ordered collection of functions, looked up by name.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: Vec<Box<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function. Names must be unique.
    pub fn register(&mut self, function: Box<dyn Function>) -> Result<()> {
        if self.lookup(function.name()).is_some() {
            return Err(AskDbError::DuplicateFunction(function.name().to_string()));
        }
        debug!(function = function.name(), "Registered function");
        self.functions.push(function);
        Ok(())
    }

    pub fn register_all(&mut self, functions: Vec<Box<dyn Function>>) -> Result<()> {
        for function in functions {
            self.register(function)?;
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Function> {
        self.functions
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    pub fn to_schema_list(&self) -> Vec<FunctionSpec> {
        self.functions.iter().map(|f| f.spec().clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Check arguments against the function's declared parameter schema.
    pub fn validate_arguments(&self, name: &str, arguments: &Value) -> Result<()> {
        let function = self
            .lookup(name)
            .ok_or_else(|| AskDbError::Other(format!("Function '{}' not found", name)))?;

        let invalid = |message: String| AskDbError::InvalidArguments {
            name: name.to_string(),
            message,
        };

        let schema_json = function.spec().parameters.to_json();
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_json)
            .map_err(|e| invalid(format!("Invalid function schema: {}", e)))?;

        if let Err(errors) = schema.validate(arguments) {
            let messages: Vec<String> = errors
                .map(|e| format!("{}: {}", e.instance_path, e))
                .collect();
            return Err(invalid(messages.join("; ")));
        }

        Ok(())
    }
}
