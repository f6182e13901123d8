//! segwal - size-bounded, replayable write-ahead log
//!
//! Payloads are appended to an in-memory segment, segments are persisted
//! through a pluggable sink once full, and a reader replays every chunk in
//! offset order.
//!
//! # Quick Start
//!
//! ```
//! use segwal::{DirectorySink, Logger, LoggerConfig};
//! use segwal::Analyzer;
//! use std::sync::Arc;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! let sink = Arc::new(DirectorySink::open(dir.path()).unwrap());
//! sink.analyze().unwrap();
//!
//! let logger = Logger::new(sink, LoggerConfig::default()).unwrap();
//! logger.write(b"hello").unwrap();
//! logger.close().unwrap();
//!
//! let mut reader = logger.new_reader();
//! while reader.next() {
//!     println!("{} {:?}", reader.offset(), reader.data());
//! }
//! assert!(reader.error().is_none());
//! ```
//!
//! # Architecture
//!
//! - `segwal-core`: [`Offset`], [`Chunk`], [`Segment`] and the [`Error`] taxonomy
//! - `segwal-durability`: the [`Sink`] traits, [`MemorySink`],
//!   [`DirectorySink`], [`Logger`], [`Reader`] and the periodic flush helper

pub use segwal_core::{
    Chunk, Error, FormatError, Offset, ParseOffsetError, Result, Segment, CHUNK_OFFSET_SIZE,
    CHUNK_SEPARATOR, DEFAULT_SEGMENT_CAPACITY,
};
pub use segwal_durability::{
    flush_interval, spawn_flush_interval, Analyzer, DirectorySink, DirectorySinkConfig, Logger,
    LoggerConfig, LoggerCounters, MemorySink, Reader, SegmentLoader, SegmentWriter, Sink,
    CHECKSUM_SUFFIX,
};
