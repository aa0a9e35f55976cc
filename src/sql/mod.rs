//! Natural-language questions answered by model-written SQL.

pub mod database;
pub mod extract;
pub mod prompt;
pub mod validator;

pub use database::{Database, QueryResult, SchemaSnapshot, SqlValue, SqliteDatabase};
pub use extract::{extract_sql, Extraction};
pub use prompt::build_sql_prompt;
pub use validator::{AllowAll, ReadOnly, StatementValidator};

use crate::api::{complete, ChatBackend};
use crate::error::{AskDbError, Result};
use crate::functions::Function;
use crate::models::{FunctionSpec, ParameterSchema};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub const SQL_FUNCTION_NAME: &str = "query_schema";

/// Statement the model wrote and what the database returned for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlAnswer {
    pub statement: String,
    pub result: QueryResult,
}

pub struct SqlFunction {
    spec: FunctionSpec,
    backend: Arc<dyn ChatBackend>,
    model: String,
    database: Box<dyn Database>,
    validator: Box<dyn StatementValidator>,
}

impl SqlFunction {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        model: impl Into<String>,
        database: Box<dyn Database>,
    ) -> Self {
        let parameters = ParameterSchema::object().property(
            "input",
            ParameterSchema::string(
                "The user input to generate a SQL query after getting the schema.",
            ),
            true,
        );

        Self {
            spec: FunctionSpec::new(
                SQL_FUNCTION_NAME,
                "Get the schema for the SQL database to use in query generation.",
                parameters,
            ),
            backend,
            model: model.into(),
            database,
            validator: Box::new(AllowAll),
        }
    }

    pub fn with_validator(mut self, validator: Box<dyn StatementValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn schema(&self) -> Result<SchemaSnapshot> {
        self.database.list_tables()
    }

    /// Introspect, ask the model for SQL, extract, validate, execute.
    pub async fn answer(&self, user_input: &str) -> Result<SqlAnswer> {
        let schema = self.database.list_tables()?;
        debug!(tables = ?schema.tables(), "Schema snapshot");

        let prompt = build_sql_prompt(&schema, user_input);
        let response = complete(self.backend.as_ref(), &self.model, &prompt).await?;
        debug!(response = %response, "SQL model response");

        let statement = match extract_sql(&response) {
            Extraction::Found(statement) => statement,
            Extraction::NotFound => return Err(AskDbError::UnparsableResponse { response }),
        };
        debug!(statement = %statement, "Extracted SQL");

        self.validator.validate(&statement, self.database.as_ref())?;
        let result = self.database.execute(&statement)?;
        debug!(rows = result.rows.len(), "Query finished");

        Ok(SqlAnswer { statement, result })
    }
}

#[async_trait]
impl Function for SqlFunction {
    fn spec(&self) -> &FunctionSpec {
        &self.spec
    }

    async fn call(&self, arguments: &Value) -> Result<String> {
        let input = arguments
            .get("input")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AskDbError::InvalidArguments {
                name: SQL_FUNCTION_NAME.to_string(),
                message: "Missing required argument: input".to_string(),
            })?;

        let answer = self.answer(input).await?;
        Ok(format!(
            "The result of the SQL query is: {}",
            answer.result.render()
        ))
    }
}
