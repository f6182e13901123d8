//! Clap command tree definition.

use clap::{value_parser, Arg, ArgAction, Command};

/// Default wal directory when `--dir` is not given.
pub const DEFAULT_DIR: &str = "./wal.d";

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("segwal")
        .about("Write, replay, inspect and truncate a segmented write-ahead log")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("dir")
                .long("dir")
                .help("WAL directory (default: ./wal.d)")
                .global(true),
        )
        .arg(
            Arg::new("memory")
                .long("memory")
                .help("Use an in-memory sink; nothing is persisted")
                .action(ArgAction::SetTrue)
                .conflicts_with("dir")
                .global(true),
        )
        .arg(
            Arg::new("segment-size")
                .long("segment-size")
                .help("Segment capacity in bytes (default: 16MiB)")
                .value_parser(value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (bare payloads and values)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_write())
        .subcommand(build_read())
        .subcommand(build_truncate())
        .subcommand(build_info())
}

fn build_write() -> Command {
    Command::new("write")
        .about("Write random test payloads and close the log")
        .arg(
            Arg::new("count")
                .long("count")
                .short('n')
                .help("Number of payloads (default: 100)")
                .value_parser(value_parser!(usize))
                .default_value("100"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .help("Payload size in bytes (default: 32)")
                .value_parser(value_parser!(usize))
                .default_value("32"),
        )
}

fn build_read() -> Command {
    Command::new("read")
        .about("Replay the log")
        .arg(
            Arg::new("from")
                .long("from")
                .help("Start at this offset (nanoseconds or RFC 3339 time)"),
        )
}

fn build_truncate() -> Command {
    Command::new("truncate")
        .about("Delete every chunk at or before an offset")
        .arg(
            Arg::new("offset")
                .help("Offset (nanoseconds or RFC 3339 time)")
                .required(true),
        )
}

fn build_info() -> Command {
    Command::new("info").about("Show segment count and offset range")
}
