use thiserror::Error;

#[derive(Error, Debug)]
pub enum AskDbError {
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Duplicate function name: {0}")]
    DuplicateFunction(String),

    /// The model answered without selecting any function.
    #[error("Model response did not select a function: {0}")]
    MissingFunctionCall(String),

    #[error("Invalid arguments for function '{name}': {message}")]
    InvalidArguments { name: String, message: String },

    #[error("Schema unavailable for database '{path}': {message}")]
    SchemaUnavailable { path: String, message: String },

    #[error("No SQL statement found in model response")]
    UnparsableResponse { response: String },

    #[error("Statement rejected: {0}")]
    RejectedStatement(String),

    /// Engine message, passed through untouched.
    #[error("{0}")]
    Execution(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for AskDbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AskDbError::Timeout
        } else {
            AskDbError::Network(err)
        }
    }
}

impl From<String> for AskDbError {
    fn from(msg: String) -> Self {
        AskDbError::Other(msg)
    }
}

impl From<&str> for AskDbError {
    fn from(msg: &str) -> Self {
        AskDbError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AskDbError>;
