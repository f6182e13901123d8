//! ArgMatches → CliAction conversion.

use std::path::PathBuf;

use chrono::DateTime;
use clap::ArgMatches;
use segwal_core::{Offset, DEFAULT_SEGMENT_CAPACITY};

use crate::commands::DEFAULT_DIR;

/// Where and how to open the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// WAL directory; `None` selects the in-memory sink.
    pub dir: Option<PathBuf>,
    /// Segment capacity in bytes.
    pub segment_size: u64,
}

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Write `count` random payloads of `size` bytes.
    Write { count: usize, size: usize },
    /// Replay from `from` (or the start).
    Read { from: Option<Offset> },
    /// Truncate at `offset`.
    Truncate { offset: Offset },
    /// Report segment count and offset range.
    Info,
}

/// Extract the open options from the global flags.
pub fn matches_to_open_options(matches: &ArgMatches) -> OpenOptions {
    let dir = if matches.get_flag("memory") {
        None
    } else {
        Some(PathBuf::from(
            matches
                .get_one::<String>("dir")
                .map(String::as_str)
                .unwrap_or(DEFAULT_DIR),
        ))
    };
    OpenOptions {
        dir,
        segment_size: matches
            .get_one::<u64>("segment-size")
            .copied()
            .unwrap_or(DEFAULT_SEGMENT_CAPACITY),
    }
}

/// Convert the chosen subcommand into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("write", sub)) => Ok(CliAction::Write {
            count: sub.get_one::<usize>("count").copied().unwrap_or(100),
            size: sub.get_one::<usize>("size").copied().unwrap_or(32),
        }),
        Some(("read", sub)) => {
            let from = sub
                .get_one::<String>("from")
                .map(|s| parse_offset(s))
                .transpose()?;
            Ok(CliAction::Read { from })
        }
        Some(("truncate", sub)) => {
            let raw = sub
                .get_one::<String>("offset")
                .ok_or_else(|| "truncate: missing offset".to_string())?;
            Ok(CliAction::Truncate {
                offset: parse_offset(raw)?,
            })
        }
        Some(("info", _)) => Ok(CliAction::Info),
        Some((other, _)) => Err(format!("unknown command: {}", other)),
        None => Err("no command given".to_string()),
    }
}

/// Parse an offset given either as decimal nanoseconds or as an RFC 3339 time.
pub fn parse_offset(input: &str) -> Result<Offset, String> {
    if let Ok(offset) = Offset::parse(input) {
        return Ok(offset);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|t| Offset::from_datetime(t.into()))
        .map_err(|_| {
            format!(
                "invalid offset {:?}: expected nanoseconds or an RFC 3339 time",
                input
            )
        })
}
