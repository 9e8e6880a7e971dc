//! Common test utilities for integration tests.
//!
//! This module provides shared infrastructure for LSP integration tests,
//! including the `LspClient` for communicating with the server binary.

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};

/// LSP test client for communicating with the server binary.
pub(crate) struct LspClient {
    process: Child,
    /// Server notifications seen while waiting for responses.
    notifications: Vec<Value>,
    reader: BufReader<std::process::ChildStdout>,
}

impl LspClient {
    /// Spawn the razor-lsp binary.
    pub(crate) fn spawn() -> Self {
        let mut process = Command::new(env!("CARGO_BIN_EXE_razor-lsp"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn razor-lsp binary");

        let stdout = process.stdout.take().expect("Failed to capture stdout");

        Self {
            process,
            notifications: Vec::new(),
            reader: BufReader::new(stdout),
        }
    }

    /// Notifications captured so far, in the order received.
    #[allow(dead_code)] // Not used in all tests
    pub(crate) fn notifications(&self) -> &[Value] {
        &self.notifications
    }

    /// Send a JSON-RPC message to the server.
    pub(crate) fn send(&mut self, message: &Value) {
        let body = serde_json::to_string(message).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.process.stdin.as_mut().expect("stdin not captured");
        stdin.write_all(header.as_bytes()).unwrap();
        stdin.write_all(body.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    fn read_message(&mut self) -> Value {
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .expect("Failed to read header");

            // EOF - server closed connection
            assert!(bytes_read != 0, "Server closed connection unexpectedly");

            if line == "\r\n" || line == "\n" {
                break;
            }

            if line.to_lowercase().starts_with("content-length:") {
                content_length = line
                    .split(':')
                    .nth(1)
                    .unwrap()
                    .trim()
                    .parse()
                    .expect("Invalid content length");
            }
        }

        let mut body = vec![0u8; content_length];
        self.reader
            .read_exact(&mut body)
            .expect("Failed to read body");

        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!("Invalid JSON: {e} in: {:?}", String::from_utf8_lossy(&body))
        })
    }

    /// Read the response with `expected_id`.
    ///
    /// Notifications are captured. Server to client requests are answered
    /// with a null result, except `razor/formatProjectedEdits`, which echoes
    /// the edits back unchanged.
    pub(crate) fn read_response(&mut self, expected_id: i64) -> Value {
        loop {
            let message = self.read_message();

            let Some(id) = message.get("id").cloned() else {
                self.notifications.push(message);
                continue;
            };

            if let Some(method) = message.get("method").and_then(Value::as_str) {
                let result = if method == "razor/formatProjectedEdits" {
                    message["params"]["projectedEdits"].clone()
                } else {
                    Value::Null
                };
                self.send(&json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": result
                }));
                continue;
            }

            if id == json!(expected_id) {
                return message;
            }
        }
    }

    /// Send a request and wait for its response.
    pub(crate) fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        }));
        self.read_response(id)
    }

    pub(crate) fn notify(&mut self, method: &str, params: Value) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        }));
    }

    /// Initialize the LSP session.
    pub(crate) fn initialize(&mut self, options: Value) -> Value {
        let response = self.request(
            1,
            "initialize",
            json!({
                "processId": null,
                "capabilities": {},
                "rootUri": "file:///tmp",
                "initializationOptions": options
            }),
        );

        self.notify("initialized", json!({}));
        response
    }

    /// Open a Razor document.
    pub(crate) fn did_open(&mut self, uri: &str, version: i32, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": "razor",
                    "version": version,
                    "text": text
                }
            }),
        );
    }

    #[allow(dead_code)] // Not used in all tests
    pub(crate) fn did_change(&mut self, uri: &str, version: i32, text: &str) {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": {"uri": uri, "version": version},
                "contentChanges": [{"text": text}]
            }),
        );
    }

    #[allow(dead_code)] // Not used in all tests
    pub(crate) fn did_close(&mut self, uri: &str) {
        self.notify(
            "textDocument/didClose",
            json!({"textDocument": {"uri": uri}}),
        );
    }

    /// Publish compiler output for a host version.
    pub(crate) fn update_generated_output(&mut self, uri: &str, version: i32, output: Value) {
        let mut params = output;
        params["uri"] = json!(uri);
        params["hostDocumentVersion"] = json!(version);
        self.notify("razor/updateGeneratedOutput", params);
    }

    pub(crate) fn language_query(&mut self, id: i64, uri: &str, line: u32, character: u32) -> Value {
        self.request(
            id,
            "razor/languageQuery",
            json!({
                "uri": uri,
                "position": {"line": line, "character": character}
            }),
        )
    }

    /// Shutdown the server.
    pub(crate) fn shutdown(&mut self) -> Value {
        self.request(999, "shutdown", Value::Null)
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}
