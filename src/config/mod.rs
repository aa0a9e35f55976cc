mod api;
mod defaults;
mod validation;

use crate::cli::Args;
use crate::dispatcher::{ArgumentSource, DispatcherConfig, ToolBinding};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use api::ApiConfig;
pub use defaults::{DEFAULT_API_ENDPOINT, DEFAULT_DATABASE, DEFAULT_MODEL};
pub use validation::{expand_env_var_in_string, parse_flag, parse_timeout, timeout_from_secs};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub sql_model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "defaults::default_read_only")]
    pub read_only: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            read_only: defaults::default_read_only(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub binding: ToolBinding,
    #[serde(default)]
    pub arguments: ArgumentSource,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

/// On-disk configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub request_timeout: Option<Duration>,
    pub model: String,
    pub sql_model: String,
    pub system_prompt: Option<String>,
    pub database_path: PathBuf,
    pub read_only: bool,
    pub binding: ToolBinding,
    pub arguments: ArgumentSource,
    pub verbose: bool,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let json_config = JsonConfig::load()?;
        Self::resolve(args, json_config)
    }

    /// Merge sources: CLI args > env vars > config file > defaults.
    pub fn resolve(args: &Args, json_config: JsonConfig) -> Result<Self> {
        let api_key = env::var("ASKDB_API_KEY").ok().filter(|k| !k.is_empty());

        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| env::var("ASKDB_API_ENDPOINT").ok())
            .or(json_config.api.endpoint)
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let request_timeout = match env::var("ASKDB_TIMEOUT").ok() {
            Some(raw) => Some(parse_timeout(&raw).context("ASKDB_TIMEOUT")?),
            None => json_config
                .api
                .timeout_secs
                .map(timeout_from_secs)
                .transpose()
                .context("api.timeout_secs")?,
        };

        let model = args
            .model
            .clone()
            .or_else(|| env::var("ASKDB_MODEL").ok())
            .or(json_config.model.default_model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let sql_model = args
            .sql_model
            .clone()
            .or_else(|| env::var("ASKDB_SQL_MODEL").ok())
            .or(json_config.model.sql_model)
            .unwrap_or_else(|| model.clone());

        let system_prompt = env::var("ASKDB_SYSTEM_PROMPT")
            .ok()
            .or(json_config.model.system_prompt);

        let database_path = args
            .database
            .clone()
            .or_else(|| env::var("ASKDB_DATABASE").ok())
            .or(json_config.database.path)
            .map(|p| expand_env_var_in_string(&p))
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        // --read-only can only tighten
        let read_only = args.read_only
            || match env::var("ASKDB_READ_ONLY").ok() {
                Some(v) => parse_flag(&v),
                None => json_config.database.read_only,
            };

        let verbose = args.verbose
            || env::var("ASKDB_VERBOSE")
                .ok()
                .map(|v| parse_flag(&v))
                .or(json_config.session.verbose)
                .unwrap_or(false);

        Ok(Config {
            api_key,
            api_endpoint,
            request_timeout,
            model,
            sql_model,
            system_prompt,
            database_path: PathBuf::from(database_path),
            read_only,
            binding: json_config.dispatch.binding,
            arguments: json_config.dispatch.arguments,
            verbose,
        })
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            model: self.model.clone(),
            prompt_template: self.system_prompt.clone(),
            binding: self.binding,
            arguments: self.arguments,
        }
    }
}

impl JsonConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))
        }
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".askdb.yaml"),
            PathBuf::from(".askdb.yml"),
            PathBuf::from(".askdb.json"),
        ];

        if let Some(config_dir) = Self::user_config_dir() {
            paths.push(config_dir.join("askdb.yaml"));
            paths.push(config_dir.join("askdb.yml"));
            paths.push(config_dir.join("askdb.json"));
        }

        paths
    }

    pub fn user_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("askdb"))
    }

    /// Config populated with the built-in defaults, for `--config-init`.
    pub fn example() -> Self {
        JsonConfig {
            api: ApiConfig {
                endpoint: Some(DEFAULT_API_ENDPOINT.to_string()),
                timeout_secs: None,
            },
            model: ModelConfig {
                default_model: Some(DEFAULT_MODEL.to_string()),
                sql_model: None,
                system_prompt: None,
            },
            database: DatabaseConfig {
                path: Some(DEFAULT_DATABASE.to_string()),
                read_only: false,
            },
            dispatch: DispatchConfig::default(),
            session: SessionConfig {
                verbose: Some(false),
            },
        }
    }

    /// Write the example config as YAML. Refuses to overwrite.
    pub fn write_example(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(&Self::example())?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
