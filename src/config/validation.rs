use crate::error::AskDbError;
use regex::Regex;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

fn env_placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern compiles"))
}

/// Expand environment variables in a string using ${VAR_NAME} syntax.
/// Unset variables are left as written.
pub fn expand_env_var_in_string(value: &str) -> String {
    env_placeholder()
        .replace_all(value, |caps: &regex::Captures| {
            env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Parse the usual truthy spellings.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Request timeout in whole seconds. Zero is rejected.
pub fn timeout_from_secs(secs: u64) -> Result<Duration, AskDbError> {
    if secs == 0 {
        return Err(AskDbError::Config(
            "timeout must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a timeout given as text, e.g. from `ASKDB_TIMEOUT`.
pub fn parse_timeout(value: &str) -> Result<Duration, AskDbError> {
    let secs = value.trim().parse::<u64>().map_err(|_| {
        AskDbError::Config(format!(
            "invalid timeout '{}': expected a whole number of seconds",
            value
        ))
    })?;
    timeout_from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_timeout(" 5 ").unwrap(), Duration::from_secs(5));
        for bad in ["0", "", "abc", "-1", "1.5"] {
            assert!(
                matches!(parse_timeout(bad), Err(AskDbError::Config(_))),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_expand_known_and_unknown_vars() {
        env::set_var("ASKDB_TEST_EXPAND_DIR", "/data");
        assert_eq!(
            expand_env_var_in_string("${ASKDB_TEST_EXPAND_DIR}/chinook.db"),
            "/data/chinook.db"
        );
        assert_eq!(
            expand_env_var_in_string("${ASKDB_TEST_SURELY_UNSET}/x.db"),
            "${ASKDB_TEST_SURELY_UNSET}/x.db"
        );
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("no"));
        assert!(!parse_flag(""));
    }
}
