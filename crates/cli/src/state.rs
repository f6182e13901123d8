//! Open log handle used by every command.
//!
//! Opens the sink (analyzing a directory before anything else touches it)
//! and wraps it in a logger. The logger is closed when the command is done.

use std::path::PathBuf;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use segwal_core::{Chunk, Error, Offset, Result};
use segwal_durability::{Analyzer, DirectorySink, Logger, LoggerConfig, MemorySink, Sink};
use serde::Serialize;

use crate::parse::OpenOptions;

/// Segment count and offset range of a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogInfo {
    /// WAL directory, absent for the in-memory sink.
    pub dir: Option<PathBuf>,
    /// Number of persisted segments.
    pub segments: usize,
    /// Oldest persisted offset.
    pub oldest: Option<Offset>,
    /// Newest persisted offset.
    pub newest: Option<Offset>,
}

/// Outcome of a `write` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Payloads written.
    pub written: usize,
    /// Payload bytes written.
    pub bytes: u64,
    /// Segments flushed to the sink.
    pub flushes: u64,
    /// Offset range of the log after closing.
    pub info: LogInfo,
}

/// A logger bound to the sink selected on the command line.
pub struct WalSession {
    dir: Option<PathBuf>,
    logger: Logger,
}

impl WalSession {
    /// Open the sink described by `opts`.
    pub fn open(opts: &OpenOptions) -> Result<Self> {
        let (dir, sink): (Option<PathBuf>, Arc<dyn Sink>) = match &opts.dir {
            Some(dir) => {
                let sink = DirectorySink::open(dir)?;
                sink.analyze()?;
                (Some(sink.dir().to_path_buf()), Arc::new(sink))
            }
            None => (None, Arc::new(MemorySink::new())),
        };
        let config = LoggerConfig::new().with_segment_capacity(opts.segment_size);
        let logger = Logger::new(sink, config)?;
        tracing::debug!(dir = ?dir, segments = logger.sink().num_segments(), "opened wal");
        Ok(WalSession { dir, logger })
    }

    /// Write `count` random alphanumeric payloads of `size` bytes, then close.
    pub fn write_random(&self, count: usize, size: usize) -> Result<WriteSummary> {
        let mut rng = rand::thread_rng();
        for _ in 0..count {
            let payload: Vec<u8> = (&mut rng).sample_iter(&Alphanumeric).take(size).collect();
            self.logger.write(&payload)?;
        }
        self.logger.close()?;

        let counters = self.logger.counters();
        Ok(WriteSummary {
            written: counters.writes as usize,
            bytes: counters.bytes_written,
            flushes: counters.flushes,
            info: self.info()?,
        })
    }

    /// Feed every chunk from `from` (or the start) to `visit`.
    pub fn replay<F>(&self, from: Option<Offset>, mut visit: F) -> Result<usize>
    where
        F: FnMut(&Chunk),
    {
        let mut reader = match from {
            Some(offset) => self.logger.new_reader_from(offset),
            None => self.logger.new_reader(),
        };
        let mut count = 0;
        while reader.next() {
            if let Some(chunk) = reader.chunk() {
                visit(chunk);
                count += 1;
            }
        }
        match reader.into_error() {
            Some(e) => Err(e),
            None => Ok(count),
        }
    }

    /// Delete every chunk at or before `offset`.
    pub fn truncate(&self, offset: Offset) -> Result<LogInfo> {
        self.logger.truncate(offset)?;
        self.info()
    }

    /// Segment count and offset range.
    pub fn info(&self) -> Result<LogInfo> {
        let sink = self.logger.sink();
        let (oldest, newest) = match sink.offsets() {
            Ok((oldest, newest)) => (Some(oldest), Some(newest)),
            Err(Error::NoSegments) => (None, None),
            Err(e) => return Err(e),
        };
        Ok(LogInfo {
            dir: self.dir.clone(),
            segments: sink.num_segments(),
            oldest,
            newest,
        })
    }

    /// Flush anything buffered and close the sink.
    pub fn close(&self) -> Result<()> {
        self.logger.close()
    }
}
