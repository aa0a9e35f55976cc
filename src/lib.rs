//! askdb: let a local chat model pick a function and answer questions about a
//! SQLite database with SQL it writes itself.
//!
//! - [`functions`]: `Function` trait and the ordered registry
//! - [`dispatcher`]: binds the registry to a model and routes its choice
//! - [`sql`]: the SQL function: schema snapshot, prompt, extraction, validation, execution
//! - [`api`]: chat backend trait and the OpenAI-compatible client
//! - [`config`]: layered configuration (CLI, env, YAML/JSON file)

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod functions;
pub mod models;
pub mod sql;
pub mod ui;

pub use dispatcher::{DispatchOutcome, ModelDispatcher};
pub use error::{AskDbError, Result};
