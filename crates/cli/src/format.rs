//! Output → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): tab-separated columns and short summaries
//! - **JSON** (`--json`): one JSON object per chunk, pretty summaries
//! - **Raw** (`--raw`): bare payloads and offsets

use segwal_core::{Chunk, Error, Offset};
use serde_json::json;

use crate::state::{LogInfo, WriteSummary};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format one replayed chunk as a single line.
pub fn format_chunk(chunk: &Chunk, mode: OutputMode) -> String {
    let payload = String::from_utf8_lossy(chunk.payload());
    match mode {
        OutputMode::Human => format!(
            "{}\t{}\t{}",
            chunk.offset(),
            format_time(chunk.offset()),
            payload
        ),
        OutputMode::Json => json!({
            "offset": chunk.offset(),
            "time": format_time(chunk.offset()),
            "payload": payload,
        })
        .to_string(),
        OutputMode::Raw => payload.into_owned(),
    }
}

/// Format the segment count and offset range of a log.
pub fn format_info(info: &LogInfo, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(info),
        OutputMode::Raw => match (info.oldest, info.newest) {
            (Some(oldest), Some(newest)) => format!("{}\n{}\n{}", info.segments, oldest, newest),
            _ => info.segments.to_string(),
        },
        OutputMode::Human => {
            let location = info
                .dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "(memory)".to_string());
            let mut out = format!("wal:      {}\nsegments: {}", location, info.segments);
            if let (Some(oldest), Some(newest)) = (info.oldest, info.newest) {
                out.push_str(&format!(
                    "\noldest:   {} ({})\nnewest:   {} ({})",
                    oldest,
                    format_time(oldest),
                    newest,
                    format_time(newest)
                ));
            }
            out
        }
    }
}

/// Format the outcome of a `write` command.
pub fn format_write_summary(summary: &WriteSummary, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(summary),
        OutputMode::Raw => format!("{}", summary.written),
        OutputMode::Human => format!(
            "wrote {} payloads ({} bytes) in {} segments\n{}",
            summary.written,
            summary.bytes,
            summary.flushes,
            format_info(&summary.info, OutputMode::Human)
        ),
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&json!({
            "error": err.to_string()
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Raw => format!("{}", err),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Render an offset as an RFC 3339 UTC time with nanoseconds.
fn format_time(offset: Offset) -> String {
    offset
        .to_datetime()
        .to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}
