//! segwal CLI: write test data into a log, replay it, inspect it, truncate it.
//!
//! ```text
//! segwal [--dir D | --memory] [--segment-size N] [--json | --raw] COMMAND
//!
//!   write [-n COUNT] [--size BYTES]   write random payloads, then close
//!   read [--from OFFSET]              replay chunks
//!   truncate OFFSET                   delete chunks at or before OFFSET
//!   info                              segment count and offset range
//! ```
//!
//! Any error is printed to stderr and the process exits with status 1.
//! Logging goes to stderr, filtered by `RUST_LOG` (default `warn`).

mod commands;
mod format;
mod parse;
mod state;

use std::process;

use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_chunk, format_error, format_info, format_write_summary, OutputMode};
use parse::{matches_to_action, matches_to_open_options, CliAction};
use segwal_core::Result;
use state::WalSession;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let session = match WalSession::open(&matches_to_open_options(&matches)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    };

    if let Err(e) = run(&session, action, output_mode).and_then(|()| session.close()) {
        eprintln!("{}", format_error(&e, output_mode));
        process::exit(1);
    }
}

fn run(session: &WalSession, action: CliAction, mode: OutputMode) -> Result<()> {
    match action {
        CliAction::Write { count, size } => {
            let summary = session.write_random(count, size)?;
            println!("{}", format_write_summary(&summary, mode));
        }
        CliAction::Read { from } => {
            let count = session.replay(from, |chunk| println!("{}", format_chunk(chunk, mode)))?;
            tracing::debug!(count, "replay finished");
        }
        CliAction::Truncate { offset } => {
            let info = session.truncate(offset)?;
            println!("{}", format_info(&info, mode));
        }
        CliAction::Info => {
            println!("{}", format_info(&session.info()?, mode));
        }
    }
    Ok(())
}
