#![allow(dead_code)]

use askdb::api::{ChatBackend, RequestBody};
use askdb::error::{AskDbError, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Backend that replays canned responses and records every request.
#[derive(Default)]
pub struct StubBackend {
    responses: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<RequestBody>>,
}

impl StubBackend {
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RequestBody> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for StubBackend {
    async fn chat(&self, request: &RequestBody) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AskDbError::Other("stub backend ran out of responses".to_string()))
    }
}

pub fn content_response(content: &str) -> Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content}
        }]
    })
}

pub fn tool_selection(name: &str, tool_input: Value) -> Value {
    content_response(&json!({"tool": name, "tool_input": tool_input}).to_string())
}

pub fn native_tool_call(name: &str, arguments: Value) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments.to_string()}
                }]
            }
        }]
    })
}

/// Temp directory holding `fixture.db` with `customers` and `invoices`.
pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
}

pub fn fixture_db() -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fixture.db");
    seed(&path);
    Fixture { _dir: dir, path }
}

fn seed(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL, country TEXT NOT NULL);
         CREATE TABLE invoices (id INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, total REAL NOT NULL);
         INSERT INTO customers (name, country) VALUES
             ('Ana', 'USA'), ('Ben', 'Canada'), ('Cleo', 'USA'),
             ('Dara', 'Brazil'), ('Eli', 'Canada'), ('Fay', 'USA');
         INSERT INTO invoices (customer_id, total) VALUES (1, 9.9), (2, 1.98), (4, 3.96);",
    )
    .unwrap();
}
