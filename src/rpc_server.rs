//! Minimark RPC server: the bookmark contract over stdin/stdout.
//!
//! Protocol: one JSON object per line.
//! Request:  {"id":1, "method":"bookmark.create", "params":{"title":"...","groupId":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr, filtered by `RUST_LOG`.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use minimark::app::{App, DATABASE_FILE};
use minimark::platform;
use minimark::rpc_handler::handle_method;

use serde_json::{json, Value};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn write_line(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let data_dir = platform::get_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        error!(dir = %data_dir.display(), error = %e, "cannot create data directory");
        std::process::exit(1);
    }
    let db_path = data_dir.join(DATABASE_FILE);

    let app = match App::new(&db_path) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            error!(path = %db_path.display(), error = %e, "failed to open store");
            std::process::exit(1);
        }
    };
    info!(path = %db_path.display(), "store ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if write_line(&mut out, &ready).is_err() {
        return;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(Value::Null);

                match handle_method(&app, method, &params) {
                    Ok(result) => json!({"id": id, "result": result}),
                    Err(err) => {
                        warn!(method, error = %err, "rpc call failed");
                        json!({"id": id, "error": err})
                    }
                }
            }
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
        };

        if write_line(&mut out, &response).is_err() {
            break;
        }
    }
}
