use super::database::Database;
use crate::error::{AskDbError, Result};

/// Gate between extraction and execution.
pub trait StatementValidator: Send + Sync {
    fn validate(&self, statement: &str, database: &dyn Database) -> Result<()>;
}

/// Executes whatever the model wrote.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl StatementValidator for AllowAll {
    fn validate(&self, _statement: &str, _database: &dyn Database) -> Result<()> {
        Ok(())
    }
}

/// Accepts exactly one `SELECT` or `WITH` statement that the engine reports
/// as read-only. `WITH ... DELETE` and friends are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadOnly;

impl StatementValidator for ReadOnly {
    fn validate(&self, statement: &str, database: &dyn Database) -> Result<()> {
        let body = statement.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());

        if body.is_empty() {
            return Err(AskDbError::RejectedStatement("empty statement".to_string()));
        }

        if has_unquoted_semicolon(body) {
            return Err(AskDbError::RejectedStatement(
                "multiple statements are not allowed".to_string(),
            ));
        }

        let keyword = body
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        if !matches!(keyword.as_str(), "SELECT" | "WITH") {
            return Err(AskDbError::RejectedStatement(format!(
                "only SELECT statements are allowed, got '{}'",
                keyword
            )));
        }

        if !database.statement_is_read_only(body)? {
            return Err(AskDbError::RejectedStatement(
                "statement modifies the database".to_string(),
            ));
        }

        Ok(())
    }
}

/// True when a `;` appears outside string literals, quoted identifiers and comments.
fn has_unquoted_semicolon(sql: &str) -> bool {
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '[' => quote = Some(']'),
                ';' => return true,
                '-' if chars.peek() == Some(&'-') => {
                    // Line comment runs to end of line
                    for next in chars.by_ref() {
                        if next == '\n' {
                            break;
                        }
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut prev = '\0';
                    for next in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                }
                _ => {}
            },
        }
    }

    false
}
