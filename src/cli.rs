use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "askdb")]
#[command(about = "Ask a local LLM questions about a SQLite database", long_about = None)]
pub struct Args {
    #[arg(short = 'm', long = "model", help = "Model used to select a function")]
    pub model: Option<String>,

    #[arg(long = "sql-model", help = "Model used to write SQL (defaults to --model)")]
    pub sql_model: Option<String>,

    #[arg(short = 'd', long = "database", help = "Path to the SQLite database file")]
    pub database: Option<String>,

    #[arg(
        long = "api-endpoint",
        help = "Custom API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(long = "read-only", help = "Only run single SELECT statements")]
    pub read_only: bool,

    #[arg(
        long = "direct",
        help = "Skip function selection and show the generated SQL with its rows"
    )]
    pub direct: bool,

    #[arg(long = "tables", help = "List the tables in the database and exit")]
    pub tables: bool,

    #[arg(long = "config-init", help = "Write an example config file and exit")]
    pub config_init: bool,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostic logs")]
    pub verbose: bool,

    #[arg(help = "Question to ask")]
    pub question: Vec<String>,
}
