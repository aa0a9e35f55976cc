use askdb::api::{ChatBackend, OpenAiCompatClient};
use askdb::cli::Args;
use askdb::config::{Config, JsonConfig};
use askdb::dispatcher::ModelDispatcher;
use askdb::functions::Function;
use askdb::sql::{AllowAll, ReadOnly, SqlFunction, SqliteDatabase, StatementValidator};
use askdb::ui::{display_answer, display_error, display_schema, display_sql, display_table};
use clap::Parser;
use colored::*;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        display_error(&format!("{:#}", e));
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.config_init {
        return init_config();
    }

    let config = Config::from_env_and_args(&args)?;
    init_logging(config.verbose);

    let database = SqliteDatabase::new(config.database_path.clone()).read_only(config.read_only);

    let backend: Arc<dyn ChatBackend> = Arc::new(OpenAiCompatClient::new(
        &config.api_endpoint,
        config.api_key.as_deref(),
        config.request_timeout,
    )?);

    let validator: Box<dyn StatementValidator> = if config.read_only {
        Box::new(ReadOnly)
    } else {
        Box::new(AllowAll)
    };
    let sql_function = SqlFunction::new(backend.clone(), &config.sql_model, Box::new(database))
        .with_validator(validator);

    if args.tables {
        display_schema(&sql_function.schema()?);
        return Ok(());
    }

    if args.question.is_empty() {
        anyhow::bail!("No question given. Usage: askdb [OPTIONS] <QUESTION>...");
    }
    let question = args.question.join(" ");

    if args.direct {
        let answer = sql_function.answer(&question).await?;
        display_sql(&answer.statement);
        display_table(&answer.result);
        return Ok(());
    }

    let functions: Vec<Box<dyn Function>> = vec![Box::new(sql_function)];
    let dispatcher = ModelDispatcher::new(backend, functions, config.dispatcher_config())?;

    let answer = dispatcher.run(&question).await?;
    display_answer(&answer);
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("askdb=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn init_config() -> anyhow::Result<()> {
    let path = JsonConfig::user_config_dir()
        .map(|dir| dir.join("askdb.yaml"))
        .unwrap_or_else(|| ".askdb.yaml".into());

    JsonConfig::write_example(&path)?;
    println!(
        "{}",
        format!("Config written to {}", path.display()).green()
    );
    Ok(())
}
