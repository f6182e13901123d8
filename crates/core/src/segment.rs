//! Segments: size-bounded chunk buffers
//!
//! A [`Segment`] is the unit of buffering and persistence. The logger
//! appends chunks to its active segment until one no longer fits, then hands
//! the segment to a sink and starts a new one.
//!
//! # Capacity accounting
//!
//! Usage is measured in raw chunk bytes: [`CHUNK_OFFSET_SIZE`] plus the
//! payload length for every stored chunk. A write is admitted when its
//! payload length does not exceed the remaining capacity, so a single chunk
//! may overshoot the nominal capacity by at most the offset width. The
//! persisted form (see [`Segment::serialize`]) is larger still, because of
//! base64 and line framing; [`Segment::encoded_byte_size`] reports it.
//!
//! # Locking
//!
//! Every operation takes the segment's internal mutex for its duration. A
//! segment is safe to share between threads, but concurrent readers share
//! one read cursor; give each consumer its own clone instead.

use crate::chunk::{Chunk, CHUNK_OFFSET_SIZE};
use crate::error::{Error, FormatError, Result};
use crate::offset::Offset;
use parking_lot::Mutex;
use std::io::{self, Read, Write};

/// Default segment capacity in bytes (16 MiB).
pub const DEFAULT_SEGMENT_CAPACITY: u64 = 16 * 1024 * 1024;

/// A size-bounded, ordered, append-only buffer of chunks with a read cursor.
pub struct Segment {
    capacity: u64,
    state: Mutex<SegmentState>,
}

#[derive(Default)]
struct SegmentState {
    chunks: Vec<Chunk>,
    /// Raw bytes of all stored chunks
    raw_size: u64,
    /// Index of the chunk returned by `current()`; None means "before the first".
    cursor: Option<usize>,
}

impl SegmentState {
    fn admit(&self, capacity: u64, payload_len: usize) -> Result<()> {
        if payload_len as u64 > capacity.saturating_sub(self.raw_size) {
            return Err(Error::NotEnoughSpace);
        }
        Ok(())
    }

    fn push(&mut self, chunk: Chunk) {
        self.raw_size += chunk.raw_len() as u64;
        self.chunks.push(chunk);
    }
}

impl Segment {
    /// Create an empty segment holding at most `capacity` raw bytes.
    pub fn new(capacity: u64) -> Self {
        Segment {
            capacity,
            state: Mutex::new(SegmentState::default()),
        }
    }

    /// Load a segment from its serialized form.
    ///
    /// The result is sealed: its capacity equals its raw size, so it rejects
    /// any further non-empty write.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let state = parse_chunks(data)?;
        Ok(Segment {
            capacity: state.raw_size,
            state: Mutex::new(state),
        })
    }

    /// Build a segment directly from chunks, bypassing the capacity check.
    ///
    /// Intended for tooling that reassembles segments; the capacity is set to
    /// the larger of `capacity` and the chunks' raw size.
    pub fn from_chunks(capacity: u64, chunks: impl IntoIterator<Item = Chunk>) -> Self {
        let mut state = SegmentState::default();
        for chunk in chunks {
            state.push(chunk);
        }
        Segment {
            capacity: capacity.max(state.raw_size),
            state: Mutex::new(state),
        }
    }

    /// Configured capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Append a copy of `payload` as a new chunk stamped with the current time.
    ///
    /// An empty payload is accepted and stores nothing. Fails with
    /// [`Error::NotEnoughSpace`] when the payload exceeds the remaining
    /// capacity, leaving the segment unchanged.
    pub fn write(&self, payload: &[u8]) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }
        let mut state = self.state.lock();
        state.admit(self.capacity, payload.len())?;
        state.push(Chunk::new(payload));
        Ok(())
    }

    /// Append a chunk that already carries its offset.
    ///
    /// Same admission rules as [`Segment::write`].
    pub fn append(&self, chunk: Chunk) -> Result<()> {
        if chunk.payload().is_empty() {
            return Ok(());
        }
        let mut state = self.state.lock();
        state.admit(self.capacity, chunk.payload().len())?;
        state.push(chunk);
        Ok(())
    }

    /// Bytes left before the segment is at capacity.
    pub fn remaining_capacity(&self) -> u64 {
        self.capacity.saturating_sub(self.state.lock().raw_size)
    }

    /// Advance the read cursor.
    ///
    /// Returns `false`, leaving the cursor where it is, when every chunk
    /// has been read.
    ///
    /// ```
    /// # use segwal_core::Segment;
    /// let seg = Segment::new(1024);
    /// seg.write(b"a").unwrap();
    /// seg.write(b"b").unwrap();
    /// let mut seen = Vec::new();
    /// while seg.next() {
    ///     seen.push(seg.current().unwrap().into_payload());
    /// }
    /// assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec()]);
    /// ```
    pub fn next(&self) -> bool {
        let mut state = self.state.lock();
        let next = state.cursor.map_or(0, |i| i + 1);
        if next >= state.chunks.len() {
            return false;
        }
        state.cursor = Some(next);
        true
    }

    /// The chunk at the read cursor, or `None` before the first `next()`.
    pub fn current(&self) -> Option<Chunk> {
        let state = self.state.lock();
        state.cursor.and_then(|i| state.chunks.get(i).cloned())
    }

    /// Offset of the chunk at the read cursor.
    pub fn current_offset(&self) -> Option<Offset> {
        let state = self.state.lock();
        state
            .cursor
            .and_then(|i| state.chunks.get(i))
            .map(Chunk::offset)
    }

    /// Move the read cursor back before the first chunk.
    pub fn rewind(&self) {
        self.state.lock().cursor = None;
    }

    /// Offsets of the oldest and newest chunk.
    ///
    /// An empty segment reports `(Offset::ZERO, Offset::ZERO)`.
    pub fn limits(&self) -> (Offset, Offset) {
        let state = self.state.lock();
        match (state.chunks.first(), state.chunks.last()) {
            (Some(first), Some(last)) => (first.offset(), last.offset()),
            _ => (Offset::ZERO, Offset::ZERO),
        }
    }

    /// Remove every chunk whose offset is `<= offset`.
    ///
    /// The remaining chunks keep their order. The read cursor keeps pointing
    /// at the last chunk it had consumed that survived, or moves before the
    /// first chunk if none did.
    pub fn truncate(&self, offset: Offset) {
        let mut state = self.state.lock();

        let consumed = state.cursor.map_or(0, |i| i + 1);
        let consumed_kept = state.chunks[..consumed]
            .iter()
            .filter(|c| c.offset() > offset)
            .count();

        state.chunks.retain(|c| c.offset() > offset);
        state.raw_size = state.chunks.iter().map(|c| c.raw_len() as u64).sum();
        state.cursor = consumed_kept.checked_sub(1);
    }

    /// Serialize every chunk as one line of text, in order.
    ///
    /// An empty segment serializes to zero bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let state = self.state.lock();
        let mut out = Vec::with_capacity(encoded_size(&state.chunks) as usize);
        for chunk in &state.chunks {
            out.extend_from_slice(chunk.encode().as_bytes());
            out.push(b'\n');
        }
        out
    }

    /// Stream the serialized form into `w`, returning the bytes written.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<u64> {
        let state = self.state.lock();
        let mut written = 0u64;
        for chunk in &state.chunks {
            let mut line = chunk.encode().into_bytes();
            line.push(b'\n');
            w.write_all(&line)?;
            written += line.len() as u64;
        }
        Ok(written)
    }

    /// Populate an empty segment from serialized data.
    ///
    /// This is a load-only path: it fails with [`Error::AlreadyPopulated`]
    /// if the segment holds any chunk. Empty lines are skipped. A line that
    /// does not decode fails the whole load with a [`FormatError::Line`]
    /// naming its index, and leaves the segment empty.
    pub fn deserialize(&self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if !state.chunks.is_empty() {
            return Err(Error::AlreadyPopulated);
        }
        *state = parse_chunks(data)?;
        Ok(())
    }

    /// Read `r` to the end and [`deserialize`](Segment::deserialize) it.
    pub fn read_from<R: Read>(&self, r: &mut R) -> Result<u64> {
        if !self.is_empty() {
            return Err(Error::AlreadyPopulated);
        }
        let mut data = Vec::new();
        r.read_to_end(&mut data)
            .map_err(|e| Error::io("read", "<segment data>", e))?;
        self.deserialize(&data)?;
        Ok(data.len() as u64)
    }

    /// Number of chunks held.
    pub fn chunk_count(&self) -> usize {
        self.state.lock().chunks.len()
    }

    /// Whether the segment holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.state.lock().chunks.is_empty()
    }

    /// Sum of raw chunk lengths (offset width + payload).
    pub fn raw_byte_size(&self) -> u64 {
        self.state.lock().raw_size
    }

    /// Length of [`Segment::serialize`]'s output.
    pub fn encoded_byte_size(&self) -> u64 {
        encoded_size(&self.state.lock().chunks)
    }

    /// Snapshot of the stored chunks, in order.
    pub fn chunks(&self) -> Vec<Chunk> {
        self.state.lock().chunks.clone()
    }
}

fn encoded_size(chunks: &[Chunk]) -> u64 {
    chunks.iter().map(|c| c.encoded_len() as u64 + 1).sum()
}

fn parse_chunks(data: &[u8]) -> Result<SegmentState> {
    let mut state = SegmentState::default();
    for (line, row) in data.split(|&b| b == b'\n').enumerate() {
        if row.is_empty() {
            continue;
        }
        let chunk = Chunk::decode(row).map_err(|e| FormatError::Line {
            line,
            source: Box::new(e),
        })?;
        state.push(chunk);
    }
    Ok(state)
}

impl Default for Segment {
    fn default() -> Self {
        Segment::new(DEFAULT_SEGMENT_CAPACITY)
    }
}

/// Cloning copies capacity and chunks; the clone's cursor starts before the
/// first chunk.
impl Clone for Segment {
    fn clone(&self) -> Self {
        let state = self.state.lock();
        Segment {
            capacity: self.capacity,
            state: Mutex::new(SegmentState {
                chunks: state.chunks.clone(),
                raw_size: state.raw_size,
                cursor: None,
            }),
        }
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        let limits = match (state.chunks.first(), state.chunks.last()) {
            (Some(a), Some(b)) => (a.offset(), b.offset()),
            _ => (Offset::ZERO, Offset::ZERO),
        };
        f.debug_struct("Segment")
            .field("capacity", &self.capacity)
            .field("chunks", &state.chunks.len())
            .field("raw_size", &state.raw_size)
            .field("limits", &limits)
            .field("cursor", &state.cursor)
            .finish()
    }
}
