//! Core types for segwal
//!
//! This crate defines the in-memory data model of the write-ahead log:
//! - Offset: nanosecond timestamp identifying a record's position
//! - Chunk: one record (offset + payload) and its line-oriented text encoding
//! - Segment: size-bounded, ordered buffer of chunks with a read cursor
//! - Error: error type hierarchy shared by every segwal crate
//!
//! Persistence lives in `segwal-durability`; nothing in this crate touches disk.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod error;
pub mod offset;
pub mod segment;

pub use chunk::{Chunk, CHUNK_OFFSET_SIZE, CHUNK_SEPARATOR};
pub use error::{Error, FormatError, ParseOffsetError, Result};
pub use offset::Offset;
pub use segment::{Segment, DEFAULT_SEGMENT_CAPACITY};
