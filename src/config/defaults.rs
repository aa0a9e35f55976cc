pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:11434/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "llama3";

pub const DEFAULT_DATABASE: &str = "chinook.db";

pub fn default_read_only() -> bool {
    false
}
