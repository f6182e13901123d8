//! Durability layer for segwal
//!
//! This crate handles everything that persists or replays segments:
//!
//! - Sink: capability traits every persistence backend implements
//! - MemorySink: in-process segment store
//! - DirectorySink: one file per segment plus a CRC-64 checksum file
//! - Logger: buffered writer that rotates full segments into a sink
//! - Reader: sequential replay across segments
//! - flush: periodic flush helper for a shared logger

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checksum;
pub mod config;
pub mod flush;
pub mod logger;
pub mod reader;
pub mod sink;

pub use config::LoggerConfig;
pub use flush::{flush_interval, spawn_flush_interval};
pub use logger::{Logger, LoggerCounters};
pub use reader::Reader;
pub use sink::{
    Analyzer, DirectorySink, DirectorySinkConfig, MemorySink, SegmentLoader, SegmentWriter, Sink,
    CHECKSUM_SUFFIX,
};

pub use segwal_core::{Chunk, Error, Offset, Result, Segment};
