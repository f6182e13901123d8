//! The write-ahead logger.
//!
//! A [`Logger`] buffers payloads in an in-memory active [`Segment`] and hands
//! full segments to a [`Sink`]. Each payload becomes one chunk stamped with
//! the wall-clock time of the write.
//!
//! # Rotation
//!
//! When the active segment reports [`Error::NotEnoughSpace`] the logger
//! persists it, starts a fresh segment of the configured capacity and retries
//! the write exactly once. Payloads larger than the capacity are rejected up
//! front with [`Error::TooLarge`], so the retry always lands in an empty
//! segment that can hold it.
//!
//! # Locking
//!
//! One mutex guards the active segment, the closed flag and the counters.
//! `write` holds it across rotation, so a slow sink stalls every concurrent
//! writer.

use crate::config::LoggerConfig;
use crate::reader::Reader;
use crate::sink::Sink;
use parking_lot::Mutex;
use segwal_core::{Error, Offset, Result, Segment};
use std::sync::Arc;

/// Cumulative logger counters.
///
/// These accumulate over the lifetime of the logger and are never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggerCounters {
    /// Non-empty payloads accepted by `write`
    pub writes: u64,
    /// Payload bytes accepted by `write`
    pub bytes_written: u64,
    /// Non-empty segments handed to the sink
    pub flushes: u64,
}

struct LoggerState {
    active: Segment,
    closed: bool,
    counters: LoggerCounters,
}

/// Buffers writes into segments and persists them through a [`Sink`].
///
/// The logger is `Send + Sync`; share it behind an `Arc`.
///
/// ```
/// use segwal_durability::{Logger, LoggerConfig, MemorySink};
/// use std::sync::Arc;
///
/// let logger = Logger::new(Arc::new(MemorySink::new()), LoggerConfig::default()).unwrap();
/// logger.write(b"hello").unwrap();
/// logger.close().unwrap();
///
/// let mut reader = logger.new_reader();
/// assert!(reader.next());
/// assert_eq!(reader.data(), b"hello");
/// ```
pub struct Logger {
    sink: Arc<dyn Sink>,
    config: LoggerConfig,
    state: Mutex<LoggerState>,
}

impl Logger {
    /// Create an open logger writing to `sink`.
    ///
    /// Fails with [`Error::InvalidConfig`] if `config` does not validate.
    pub fn new(sink: Arc<dyn Sink>, config: LoggerConfig) -> Result<Self> {
        config.validate()?;
        let active = Segment::new(config.segment_capacity);
        Ok(Logger {
            sink,
            config,
            state: Mutex::new(LoggerState {
                active,
                closed: false,
                counters: LoggerCounters::default(),
            }),
        })
    }

    /// Append `payload` as a new chunk.
    ///
    /// An empty payload is accepted and stores nothing.
    pub fn write(&self, payload: &[u8]) -> Result<()> {
        let capacity = self.config.segment_capacity;
        if payload.len() as u64 > capacity {
            return Err(Error::TooLarge {
                size: payload.len(),
                capacity,
            });
        }

        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::LoggerClosed);
        }

        match state.active.write(payload) {
            Ok(()) => {}
            Err(Error::NotEnoughSpace) => {
                self.rotate(&mut state)?;
                match state.active.write(payload) {
                    Ok(()) => {}
                    Err(Error::NotEnoughSpace) => {
                        tracing::error!(
                            size = payload.len(),
                            capacity,
                            "payload rejected by freshly rotated segment"
                        );
                        return Err(Error::RotationOverflow {
                            size: payload.len(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }

        if !payload.is_empty() {
            state.counters.writes += 1;
            state.counters.bytes_written += payload.len() as u64;
        }
        Ok(())
    }

    /// Persist the active segment and start a new one.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::LoggerClosed);
        }
        self.rotate(&mut state)
    }

    /// Flush, close the sink and mark the logger closed.
    ///
    /// Closing twice is a no-op. If the final flush fails the logger stays
    /// open so the caller can retry.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        self.rotate(&mut state).map_err(|e| e.context("close"))?;
        self.sink.close().map_err(|e| e.context("close sink"))?;
        state.closed = true;
        tracing::debug!(flushes = state.counters.flushes, "logger closed");
        Ok(())
    }

    /// Remove every chunk at or before `offset`, persisted or buffered.
    ///
    /// The sink is truncated first; if that fails the active segment is left
    /// untouched.
    pub fn truncate(&self, offset: Offset) -> Result<()> {
        let state = self.state.lock();
        if state.closed {
            return Err(Error::LoggerClosed);
        }
        self.sink
            .truncate(offset)
            .map_err(|e| e.context("truncate"))?;
        state.active.truncate(offset);
        Ok(())
    }

    /// Oldest and newest persisted offsets.
    ///
    /// Chunks still buffered in the active segment are not included.
    pub fn offsets(&self) -> Result<(Offset, Offset)> {
        self.sink.offsets()
    }

    /// A reader replaying the sink from the beginning.
    pub fn new_reader(&self) -> Reader {
        Reader::new(Arc::clone(&self.sink))
    }

    /// A reader replaying the sink from `offset`.
    pub fn new_reader_from(&self, offset: Offset) -> Reader {
        Reader::from_offset(Arc::clone(&self.sink), offset)
    }

    /// Snapshot of the cumulative counters.
    pub fn counters(&self) -> LoggerCounters {
        self.state.lock().counters.clone()
    }

    /// Whether `close` has completed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// The sink this logger writes to.
    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// The logger's configuration.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Number of chunks buffered in the active segment.
    pub fn active_chunks(&self) -> usize {
        self.state.lock().active.chunk_count()
    }

    /// Hand the active segment to the sink and replace it.
    ///
    /// On failure the active segment is kept, so nothing buffered is lost.
    fn rotate(&self, state: &mut LoggerState) -> Result<()> {
        self.sink
            .write_segment(&state.active)
            .map_err(|e| e.context("write segment"))?;

        if !state.active.is_empty() {
            let (oldest, newest) = state.active.limits();
            tracing::debug!(
                %oldest,
                %newest,
                chunks = state.active.chunk_count(),
                "rotated active segment"
            );
            state.counters.flushes += 1;
        }
        state.active = Segment::new(self.config.segment_capacity);
        Ok(())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("active_chunks", &state.active.chunk_count())
            .field("closed", &state.closed)
            .finish()
    }
}
