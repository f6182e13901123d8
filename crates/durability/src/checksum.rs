//! Segment checksums.
//!
//! Segment files are verified with CRC-64 over the ISO polynomial
//! (reflected, all-ones init and xor-out; catalogued as `CRC-64/GO-ISO`).
//! Checksum files store the value as 16 lowercase hex digits.

use crc::{Crc, Digest, CRC_64_GO_ISO};
use std::io::{self, Write};

/// CRC-64/GO-ISO calculator.
pub static CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

/// Checksum of `data`.
pub fn checksum(data: &[u8]) -> u64 {
    CRC64.checksum(data)
}

/// Render a checksum the way checksum files store it.
pub fn format_checksum(sum: u64) -> String {
    format!("{:016x}", sum)
}

/// Parse the contents of a checksum file.
///
/// Surrounding whitespace is ignored. Returns `None` unless the remainder
/// is exactly 16 hex digits.
pub fn parse_checksum(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.len() != 16 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(text, 16).ok()
}

/// A writer that checksums every byte passed through it.
pub struct ChecksumWriter<'a, W> {
    inner: W,
    digest: Digest<'a, u64>,
    written: u64,
}

impl<W: Write> ChecksumWriter<'static, W> {
    /// Wrap `inner`.
    pub fn new(inner: W) -> Self {
        ChecksumWriter {
            inner,
            digest: CRC64.digest(),
            written: 0,
        }
    }
}

impl<'a, W: Write> ChecksumWriter<'a, W> {
    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Finish, returning the inner writer and the checksum of everything written.
    pub fn finish(self) -> (W, u64) {
        (self.inner, self.digest.finalize())
    }
}

impl<'a, W: Write> Write for ChecksumWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.digest.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
