//! `inspector-replay` — drive the reconstruction pipeline from a
//! recorded event stream.
//!
//! Usage:
//!   inspector-replay [filter-path]
//!
//! Reads newline-delimited JSON objects `{"method": "...", "params":
//! {...}}` from stdin, feeds them to an inspector over a null transport,
//! and prints the action table and final (filtered) state to stdout.
//! Diagnostics go to stderr through `env_logger` (`RUST_LOG=warn`).

use std::io::{self, BufRead};

use serde_json::Value;
use store_inspector::{InboundEvent, Inspector, NullTransport};

fn main() {
    env_logger::init();

    let filter_path = std::env::args().nth(1);

    let mut inspector = Inspector::new(NullTransport);
    if let Some(path) = filter_path {
        inspector.set_filter_path(Some(path));
    }

    for (line_no, line) in io::stdin().lock().lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("stdin read failed: {e}");
                std::process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let envelope: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("line {}: not valid JSON: {e}", line_no + 1);
                continue;
            }
        };
        let method = envelope
            .get("method")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();
        let params = envelope.get("params").cloned().unwrap_or(Value::Null);
        match InboundEvent::decode(&method, params) {
            Ok(event) => inspector.on_event(event),
            Err(e) => eprintln!("line {}: {e}", line_no + 1),
        }
    }

    for row in inspector.rows() {
        println!("{}\t{}\t{}", row.id, row.time, row.kind);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&inspector.filtered().to_value())
            .unwrap_or_else(|e| format!("<unprintable state: {e}>"))
    );
}
