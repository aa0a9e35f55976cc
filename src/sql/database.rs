use crate::error::{AskDbError, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

const LIST_TABLES: &str = "SELECT name FROM sqlite_master WHERE type='table';";

/// Table names as they were when the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    tables: Vec<String>,
}

impl SchemaSnapshot {
    pub fn new(tables: Vec<String>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// One single-element tuple per table: `('customers',), ('invoices',)`.
    pub fn render(&self) -> String {
        self.tables
            .iter()
            .map(|t| format!("({},)", quote_text(t)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Real(f),
            ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "None"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", float_repr(*r)),
            SqlValue::Text(t) => write!(f, "{}", quote_text(t)),
            SqlValue::Blob(b) => {
                write!(f, "b'")?;
                for byte in b {
                    match byte {
                        b'\'' => write!(f, "\\'")?,
                        b'\\' => write!(f, "\\\\")?,
                        0x20..=0x7e => write!(f, "{}", *byte as char)?,
                        _ => write!(f, "\\x{:02x}", byte)?,
                    }
                }
                write!(f, "'")
            }
        }
    }
}

/// Shortest round-trip digits, positional for decimal exponents in
/// `-4..16` and `1e+16` style otherwise.
fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if value == 0.0 || (-4..16).contains(&exponent) {
        let positional = value.to_string();
        if positional.contains('.') {
            positional
        } else {
            format!("{}.0", positional)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

fn quote_text(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Every row a statement produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryResult {
    /// Rows as a list of tuples: `[('USA', 13), ('Canada', 8)]`.
    pub fn render(&self) -> String {
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                if values.len() == 1 {
                    format!("({},)", values[0])
                } else {
                    format!("({})", values.join(", "))
                }
            })
            .collect();
        format!("[{}]", rows.join(", "))
    }
}

/// Catalog introspection and statement execution against one database.
///
/// Implementations acquire a connection per call and release it before
/// returning, on success and on failure.
pub trait Database: Send + Sync {
    /// Display name used in error messages.
    fn location(&self) -> String;

    fn list_tables(&self) -> Result<SchemaSnapshot>;

    fn execute(&self, statement: &str) -> Result<QueryResult>;

    /// Ask the engine whether the statement leaves the database unchanged.
    /// Nothing is executed.
    fn statement_is_read_only(&self, statement: &str) -> Result<bool>;
}

/// A SQLite file on disk. The file must exist; it is never created.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    path: PathBuf,
    read_only: bool,
    live: Arc<AtomicUsize>,
}

impl SqliteDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: false,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Open connections with `SQLITE_OPEN_READ_ONLY`.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connections currently open through this handle.
    pub fn open_connections(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn open(&self) -> rusqlite::Result<ScopedConnection> {
        let access = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        let flags = access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&self.path, flags)?;
        self.live.fetch_add(1, Ordering::SeqCst);
        debug!(path = %self.path.display(), read_only = self.read_only, "Opened database");
        Ok(ScopedConnection {
            conn,
            live: Arc::clone(&self.live),
        })
    }
}

impl Database for SqliteDatabase {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn list_tables(&self) -> Result<SchemaSnapshot> {
        let unavailable = |e: rusqlite::Error| AskDbError::SchemaUnavailable {
            path: self.location(),
            message: e.to_string(),
        };

        let conn = self.open().map_err(unavailable)?;
        let tables = read_table_names(&conn).map_err(unavailable)?;
        Ok(SchemaSnapshot::new(tables))
    }

    fn execute(&self, statement: &str) -> Result<QueryResult> {
        let conn = self
            .open()
            .map_err(|e| AskDbError::Execution(e.to_string()))?;
        run_statement(&conn, statement).map_err(|e| AskDbError::Execution(e.to_string()))
    }

    fn statement_is_read_only(&self, statement: &str) -> Result<bool> {
        let conn = self
            .open()
            .map_err(|e| AskDbError::Execution(e.to_string()))?;
        let stmt = conn
            .prepare(statement)
            .map_err(|e| AskDbError::Execution(e.to_string()))?;
        Ok(stmt.readonly())
    }
}

fn read_table_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(LIST_TABLES)?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
    names.collect()
}

fn run_statement(conn: &Connection, statement: &str) -> rusqlite::Result<QueryResult> {
    let mut stmt = conn.prepare(statement)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = stmt.query([])?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(SqlValue::from(row.get_ref(idx)?));
        }
        collected.push(values);
    }

    Ok(QueryResult {
        columns,
        rows: collected,
    })
}

/// Connection that is closed, and uncounted, when it goes out of scope.
struct ScopedConnection {
    conn: Connection,
    live: Arc<AtomicUsize>,
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rows_as_tuples() {
        let result = QueryResult {
            columns: vec!["country".into(), "n".into()],
            rows: vec![
                vec![SqlValue::Text("USA".into()), SqlValue::Integer(13)],
                vec![SqlValue::Text("Canada".into()), SqlValue::Integer(8)],
            ],
        };
        assert_eq!(result.render(), "[('USA', 13), ('Canada', 8)]");
    }

    #[test]
    fn test_render_single_column_and_empty() {
        let result = QueryResult {
            columns: vec!["total".into()],
            rows: vec![vec![SqlValue::Real(2.5)], vec![SqlValue::Null]],
        };
        assert_eq!(result.render(), "[(2.5,), (None,)]");
        assert_eq!(QueryResult::default().render(), "[]");
    }

    #[test]
    fn test_text_quoting() {
        assert_eq!(SqlValue::Text("it's".into()).to_string(), "\"it's\"");
        assert_eq!(SqlValue::Text("a\"b'c".into()).to_string(), "'a\"b\\'c'");
        assert_eq!(SqlValue::Blob(vec![0x41, 0x00]).to_string(), "b'A\\x00'");
        assert_eq!(
            SqlValue::Text("a\r\nb\u{7}".into()).to_string(),
            "'a\\r\\nb\\x07'"
        );
    }

    #[test]
    fn test_float_repr() {
        let cases = [
            (2.5, "2.5"),
            (13.0, "13.0"),
            (-0.0, "-0.0"),
            (0.0001, "0.0001"),
            (1e15, "1000000000000000.0"),
            (1e16, "1e+16"),
            (-2.5e20, "-2.5e+20"),
            (1e-5, "1e-05"),
            (1.5e-7, "1.5e-07"),
            (f64::INFINITY, "inf"),
            (f64::NAN, "nan"),
        ];
        for (value, expected) in cases {
            assert_eq!(SqlValue::Real(value).to_string(), expected, "{value:e}");
        }
    }

    #[test]
    fn test_schema_snapshot_render() {
        let schema = SchemaSnapshot::new(vec!["albums".into()]);
        assert_eq!(schema.render(), "('albums',)");
        assert_eq!(SchemaSnapshot::default().render(), "");
    }
}
