use regex::Regex;
use std::sync::OnceLock;

const SQL_FENCE: &str = "```sql";
const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(String),
    NotFound,
}

impl Extraction {
    pub fn into_option(self) -> Option<String> {
        match self {
            Extraction::Found(statement) => Some(statement),
            Extraction::NotFound => None,
        }
    }
}

fn bare_select() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(SELECT.*;)").expect("static pattern compiles"))
}

/// Pull one SQL statement out of a model reply.
///
/// A bare `SELECT ...;` on a single line is taken first. A ```` ```sql ````
/// fence, when present, replaces it.
pub fn extract_sql(response: &str) -> Extraction {
    let mut statement = bare_select()
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    if let Some((_, after)) = response.split_once(SQL_FENCE) {
        let body = after.split(FENCE).next().unwrap_or_default().trim();
        statement = if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        };
    }

    match statement {
        Some(s) => Extraction::Found(s),
        None => Extraction::NotFound,
    }
}
