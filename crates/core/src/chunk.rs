//! Data chunks and their text encoding
//!
//! A chunk is one record written to the log: an [`Offset`] plus an opaque
//! payload. Persisted segments hold one chunk per line:
//!
//! ```text
//! <decimal offset>:<base64 payload, standard alphabet, no padding>
//! ```
//!
//! The encoding never contains a newline, so segment data can be split on
//! `\n` without escaping.

use crate::error::FormatError;
use crate::offset::Offset;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use std::fmt;
use std::str::FromStr;

/// Width of the offset header counted in a chunk's raw length.
pub const CHUNK_OFFSET_SIZE: usize = 8;

/// Separator between offset and payload in the text encoding.
pub const CHUNK_SEPARATOR: u8 = b':';

/// One record in the log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chunk {
    offset: Offset,
    payload: Vec<u8>,
}

impl Chunk {
    /// Create a chunk stamped with the current time.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self::with_offset(Offset::now(), payload)
    }

    /// Create a chunk with an explicit offset.
    pub fn with_offset(offset: Offset, payload: impl Into<Vec<u8>>) -> Self {
        Chunk {
            offset,
            payload: payload.into(),
        }
    }

    /// The chunk's offset.
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// The chunk's payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the chunk, returning its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Length used for segment capacity accounting: offset width plus payload.
    pub fn raw_len(&self) -> usize {
        CHUNK_OFFSET_SIZE + self.payload.len()
    }

    /// Encode as `<offset>:<base64(payload)>` (no trailing newline).
    pub fn encode(&self) -> String {
        let mut out = self.offset.to_string();
        out.push(CHUNK_SEPARATOR as char);
        STANDARD_NO_PAD.encode_string(&self.payload, &mut out);
        out
    }

    /// Length of [`Chunk::encode`]'s output, without allocating it.
    pub fn encoded_len(&self) -> usize {
        let n = self.payload.len();
        let body = (n / 3) * 4
            + match n % 3 {
                0 => 0,
                1 => 2,
                _ => 3,
            };
        decimal_width(self.offset.as_nanos()) + 1 + body
    }

    /// Decode one line produced by [`Chunk::encode`].
    ///
    /// Splits at the first separator; fails if there is none, if the offset
    /// is not a decimal integer, or if the payload is not valid base64.
    pub fn decode(line: &[u8]) -> Result<Self, FormatError> {
        let sep = line
            .iter()
            .position(|&b| b == CHUNK_SEPARATOR)
            .ok_or(FormatError::MissingSeparator)?;

        let offset: Offset = String::from_utf8_lossy(&line[..sep]).parse()?;
        let payload = STANDARD_NO_PAD.decode(&line[sep + 1..])?;

        Ok(Chunk { offset, payload })
    }
}

fn decimal_width(n: i64) -> usize {
    let sign = usize::from(n < 0);
    let mut v = n.unsigned_abs();
    let mut digits = 1;
    while v >= 10 {
        v /= 10;
        digits += 1;
    }
    sign + digits
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Chunk {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chunk::decode(s.as_bytes())
    }
}
