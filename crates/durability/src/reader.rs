//! Sequential replay of a sink.
//!
//! A [`Reader`] alternates between loading a segment from the sink and
//! iterating its chunks. When a segment is exhausted the next one is loaded
//! at `newest + 1`; the sink's lookup rule hands back the first segment that
//! starts at or after that offset. [`Error::EndOfLog`] from the sink ends the
//! replay cleanly.
//!
//! ```
//! use segwal_durability::{Logger, LoggerConfig, MemorySink};
//! use std::sync::Arc;
//!
//! let logger = Logger::new(Arc::new(MemorySink::new()), LoggerConfig::default()).unwrap();
//! logger.write(b"one").unwrap();
//! logger.flush().unwrap();
//! logger.write(b"two").unwrap();
//! logger.flush().unwrap();
//!
//! let mut reader = logger.new_reader();
//! let mut seen = Vec::new();
//! while reader.next() {
//!     seen.push(reader.data().to_vec());
//! }
//! assert!(reader.error().is_none());
//! assert_eq!(seen, vec![b"one".to_vec(), b"two".to_vec()]);
//! ```

use crate::sink::{SegmentLoader, Sink};
use segwal_core::{Chunk, Error, Offset, Segment};
use std::sync::Arc;

/// Single-consumer cursor over every chunk in a sink.
///
/// Not synchronized; give each consumer its own reader.
pub struct Reader<S: SegmentLoader + ?Sized = dyn Sink> {
    sink: Arc<S>,
    /// Offset replay started from; chunks older than this are skipped.
    start: Offset,
    /// Offset of the last chunk returned, or the newest offset of the last
    /// exhausted segment, whichever is later.
    offset: Offset,
    segment: Option<Segment>,
    current: Option<Chunk>,
    error: Option<Error>,
}

impl<S: SegmentLoader + ?Sized> Reader<S> {
    /// Replay from the first chunk.
    pub fn new(sink: Arc<S>) -> Self {
        Self::from_offset(sink, Offset::ZERO)
    }

    /// Replay from the first chunk at or after `offset`.
    pub fn from_offset(sink: Arc<S>, offset: Offset) -> Self {
        Reader {
            sink,
            start: offset,
            offset,
            segment: None,
            current: None,
            error: None,
        }
    }

    /// Advance to the next chunk.
    ///
    /// Returns `false` at the end of the log or on error; check
    /// [`error`](Self::error) to tell the two apart. After a clean end a
    /// later call picks up segments written in the meantime. After an
    /// error every call returns `false`.
    pub fn next(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }

        loop {
            if let Some(segment) = &self.segment {
                while segment.next() {
                    let Some(chunk) = segment.current() else {
                        continue;
                    };
                    if !self.start.is_zero() && chunk.offset().is_before(self.start) {
                        continue;
                    }
                    self.offset = chunk.offset();
                    self.current = Some(chunk);
                    return true;
                }
                let (_, newest) = segment.limits();
                if newest.is_after(self.offset) {
                    self.offset = newest;
                }
                // Nothing can follow the newest representable offset.
                if self.offset == Offset::MAX {
                    return false;
                }
            }

            let from = match self.segment {
                None => self.offset,
                // ZERO asks a sink for its first segment.
                Some(_) if self.offset.next().is_zero() => self.offset.next().next(),
                Some(_) => self.offset.next(),
            };

            match self.sink.load_segment(from) {
                Ok(segment) => {
                    tracing::trace!(%from, chunks = segment.chunk_count(), "reader loaded segment");
                    self.segment = Some(segment);
                }
                Err(e) if e.is_end_of_log() => return false,
                Err(e) => {
                    self.error = Some(e.context("wal reader"));
                    return false;
                }
            }
        }
    }

    /// Payload of the current chunk; empty before the first `next`.
    pub fn data(&self) -> &[u8] {
        self.current.as_ref().map(Chunk::payload).unwrap_or_default()
    }

    /// Offset of the current chunk.
    ///
    /// Before the first successful `next` this is the starting offset.
    pub fn offset(&self) -> Offset {
        self.current.as_ref().map_or(self.start, Chunk::offset)
    }

    /// The current chunk.
    pub fn chunk(&self) -> Option<&Chunk> {
        self.current.as_ref()
    }

    /// The error that stopped replay, if any.
    ///
    /// `None` after a clean end of log.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Consume the reader, returning the error that stopped replay.
    pub fn into_error(self) -> Option<Error> {
        self.error
    }
}

impl<S: SegmentLoader + ?Sized> std::fmt::Debug for Reader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("start", &self.start)
            .field("offset", &self.offset)
            .field("loaded", &self.segment.is_some())
            .field("error", &self.error)
            .finish()
    }
}
