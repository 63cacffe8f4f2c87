//! Line-delimited JSON-RPC 2.0 over stdio.
//!
//! One request object per line on stdin, one response per line on stdout.
//! Logs go to stderr only, so stdout stays a clean protocol channel.
//!
//! Methods: `perguntar` (alias `message`) with `params.texto` (alias
//! `params.text`). `initialize` is acknowledged silently for compatibility
//! with process-pipe supervisors.

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use crate::dispatch::Dispatcher;

/// JSON-RPC error code for a request that failed during dispatch.
const DISPATCH_ERROR_CODE: i64 = -32000;
/// JSON-RPC standard parse-error code.
const PARSE_ERROR_CODE: i64 = -32700;
/// JSON-RPC standard method-not-found code.
const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Run the stdio serve loop until stdin closes.
///
/// # Errors
///
/// Returns an error only on stdio I/O failure; request-level failures are
/// reported as JSON-RPC error responses.
pub async fn serve(dispatcher: &Dispatcher) -> anyhow::Result<()> {
    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout();
    let mut lines = stdin.lines();

    info!("stdio adapter listening");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = handle_line(dispatcher, line).await {
            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            stdout.write_all(out.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    info!("stdin closed, stdio adapter stopping");
    Ok(())
}

/// Handle one request line. `None` means no response should be written.
async fn handle_line(dispatcher: &Dispatcher, line: &str) -> Option<Value> {
    let message: Value = match serde_json::from_str(line) {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "unparseable request line");
            return Some(error_response(
                Value::Null,
                PARSE_ERROR_CODE,
                &format!("invalid JSON: {e}"),
            ));
        }
    };

    let id = message.get("id").cloned().unwrap_or(json!(0));
    let method = message.get("method").and_then(Value::as_str).unwrap_or("");

    match method {
        "perguntar" | "message" => {
            let question = message
                .pointer("/params/texto")
                .or_else(|| message.pointer("/params/text"))
                .and_then(Value::as_str)
                .unwrap_or("");

            if question.trim().is_empty() {
                return Some(error_response(
                    id,
                    DISPATCH_ERROR_CODE,
                    "pergunta vazia: informe params.texto",
                ));
            }

            match dispatcher.handle(question).await {
                Ok(envelope) => Some(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": envelope,
                })),
                Err(e) => {
                    error!(error = %e, "request failed");
                    Some(error_response(id, DISPATCH_ERROR_CODE, &e.to_string()))
                }
            }
        }
        // Supervisors send an initialize handshake; nothing to do.
        "initialize" => None,
        other => Some(error_response(
            id,
            METHOD_NOT_FOUND_CODE,
            &format!("método não reconhecido: {other}"),
        )),
    }
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}
