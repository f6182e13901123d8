//! Error types for segwal
//!
//! Every fallible operation in the workspace returns [`Error`]. Errors raised
//! deep inside a component are wrapped with a short stage label via
//! [`Error::context`], so a caller sees both where a failure happened and the
//! underlying cause. Use [`Error::root`] (or the `is_*` predicates) to match
//! on the cause without parsing message text.

use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for segwal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the write-ahead log
#[derive(Debug, Error)]
pub enum Error {
    /// The active segment cannot hold the payload; the logger rotates and retries.
    #[error("not enough space in segment")]
    NotEnoughSpace,

    /// The payload is larger than an empty segment could ever hold.
    #[error("data too large for segment: {size} bytes exceeds capacity of {capacity} bytes")]
    TooLarge {
        /// Payload length in bytes
        size: usize,
        /// Configured segment capacity in bytes
        capacity: u64,
    },

    /// The logger has been closed; no further mutation is possible.
    #[error("logger closed")]
    LoggerClosed,

    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Attempted to load persisted data into a segment that already holds chunks.
    #[error("will not load into populated segment")]
    AlreadyPopulated,

    /// No segment holds the requested offset, or anything after it.
    ///
    /// Readers treat this as a clean end of replay, not as a failure.
    #[error("end of log")]
    EndOfLog,

    /// The sink holds no segments, so it has no offset range.
    #[error("sink holds no segments")]
    NoSegments,

    /// An offset string could not be parsed.
    #[error(transparent)]
    ParseOffset(#[from] ParseOffsetError),

    /// Malformed persisted data (chunk text, segment file name, checksum file)
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A segment file does not match its recorded checksum.
    #[error("checksum mismatch for segment {} (want={expected} got={actual})", path.display())]
    Integrity {
        /// Segment file that failed verification
        path: PathBuf,
        /// Checksum recorded in the checksum file
        expected: String,
        /// Checksum computed over the segment file
        actual: String,
    },

    /// Filesystem failure, labelled with the operation that failed
    #[error("{op} {}: {source}", path.display())]
    Io {
        /// Operation name (open, create, remove, rename, stat, ...)
        op: &'static str,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A payload did not fit even after rotating to an empty segment.
    ///
    /// This cannot happen for payloads that passed the size check and
    /// indicates a bug in capacity accounting.
    #[error("payload of {size} bytes did not fit a freshly rotated segment")]
    RotationOverflow {
        /// Payload length in bytes
        size: usize,
    },

    /// An error wrapped with the stage it occurred in
    #[error("{stage}: {source}")]
    Context {
        /// Short label of the failing stage ("write segment", "truncate", ...)
        stage: &'static str,
        /// Wrapped error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with a stage label.
    pub fn context(self, stage: &'static str) -> Self {
        Error::Context {
            stage,
            source: Box::new(self),
        }
    }

    /// Build an I/O error for `op` applied to `path`.
    pub fn io(op: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// The innermost error, skipping every [`Error::Context`] layer.
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// Whether this error (at its root) is the end-of-log signal.
    pub fn is_end_of_log(&self) -> bool {
        matches!(self.root(), Error::EndOfLog)
    }

    /// Whether this error (at its root) reports a closed logger.
    pub fn is_logger_closed(&self) -> bool {
        matches!(self.root(), Error::LoggerClosed)
    }

    /// Whether this error (at its root) is a segment capacity rejection.
    pub fn is_not_enough_space(&self) -> bool {
        matches!(self.root(), Error::NotEnoughSpace)
    }
}

/// Malformed persisted data
#[derive(Debug, Error)]
pub enum FormatError {
    /// Chunk text has no `:` between offset and payload.
    #[error("no chunk separator")]
    MissingSeparator,

    /// Chunk text carries an unparseable offset.
    #[error("invalid chunk offset: {0}")]
    InvalidOffset(#[from] ParseOffsetError),

    /// Chunk payload is not valid unpadded base64.
    #[error("invalid chunk payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    /// A line of a serialized segment failed to decode.
    #[error("unmarshal chunk {line}: {source}")]
    Line {
        /// Zero-based line index within the segment data
        line: usize,
        /// Decode failure for that line
        #[source]
        source: Box<FormatError>,
    },

    /// A segment file name is not `<oldest>-<newest>`.
    #[error("malformed segment file name {name:?}: {reason}")]
    SegmentName {
        /// Offending file name
        name: String,
        /// What was wrong with it
        reason: String,
    },

    /// A checksum file does not hold a hex-encoded CRC-64.
    #[error("malformed checksum file {}: {reason}", path.display())]
    Checksum {
        /// Offending checksum file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },
}

/// An offset string that is not a decimal 64-bit integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse offset {input:?}: {source}")]
pub struct ParseOffsetError {
    /// The rejected input
    pub input: String,
    /// Integer parse failure
    #[source]
    pub source: ParseIntError,
}
