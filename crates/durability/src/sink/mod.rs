//! Segment sinks
//!
//! A sink persists segments handed over by the [`Logger`](crate::Logger)
//! and loads them back for the [`Reader`](crate::Reader). The contract is
//! split into narrow capability traits so consumers can ask for only what
//! they use; [`Sink`] bundles them with index queries and truncation.
//!
//! # Segment lookup
//!
//! [`SegmentLoader::load_segment`] with [`Offset::ZERO`] returns the
//! earliest segment. Any other offset returns the first segment, in offset
//! order, whose range contains the offset or starts after it. When no such
//! segment exists the call fails with [`Error::EndOfLog`](segwal_core::Error::EndOfLog).
//!
//! # Truncation
//!
//! `truncate(o)` deletes every whole segment whose newest offset is older
//! than `o`. If the new first segment then spans `o` (`oldest <= o <= newest`)
//! its chunks at or before `o` are removed and it is rewritten; should that
//! leave it empty it is deleted as well. At most one segment is rewritten
//! per call.

mod directory;
mod memory;
pub mod probe;

pub use directory::{DirectorySink, DirectorySinkConfig, CHECKSUM_SUFFIX};
pub use memory::MemorySink;

use segwal_core::{Offset, Result, Segment};

/// Rebuilds a sink's in-memory index from durable state.
pub trait Analyzer {
    /// Scan durable storage and rebuild the segment index.
    ///
    /// Backends without external state treat this as a no-op.
    fn analyze(&self) -> Result<()>;
}

/// Retrieves persisted segments.
pub trait SegmentLoader {
    /// Load the segment holding `offset` (see the module docs for the lookup rule).
    ///
    /// The returned segment has its own read cursor, positioned before its
    /// first chunk.
    fn load_segment(&self, offset: Offset) -> Result<Segment>;
}

/// Persists segments.
pub trait SegmentWriter {
    /// Persist `segment` and extend the known offset range.
    ///
    /// Writing a segment with no chunks is a no-op. A failed write leaves the
    /// caller's segment untouched so it can be retried.
    fn write_segment(&self, segment: &Segment) -> Result<()>;
}

/// A persistence backend for segments.
///
/// Implementations guard their own index so every method takes `&self`:
/// reads (`load_segment`, `offsets`, `num_segments`) may proceed
/// concurrently, writers (`write_segment`, `truncate`, `analyze`) are
/// serialized against everything else.
pub trait Sink: Analyzer + SegmentLoader + SegmentWriter + Send + Sync {
    /// Oldest and newest offsets across all known segments.
    ///
    /// Fails with [`Error::NoSegments`](segwal_core::Error::NoSegments) when the sink is empty.
    fn offsets(&self) -> Result<(Offset, Offset)>;

    /// Number of segments currently known to the sink.
    fn num_segments(&self) -> usize;

    /// Permanently delete every chunk at or before `offset`.
    fn truncate(&self, offset: Offset) -> Result<()>;

    /// Release any resources held by the sink.
    fn close(&self) -> Result<()>;
}

/// Index of the segment `load_segment(offset)` should return.
///
/// `ranges` must be sorted by offset.
pub(crate) fn find_segment(ranges: &[(Offset, Offset)], offset: Offset) -> Option<usize> {
    if ranges.is_empty() {
        return None;
    }
    if offset.is_zero() {
        return Some(0);
    }
    ranges
        .iter()
        .position(|&(oldest, newest)| offset.within(oldest, newest) || offset.is_before(oldest))
}

/// Work `truncate(offset)` has to do against a sorted list of ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TruncatePlan {
    /// Number of leading segments to delete outright
    pub expired: usize,
    /// Whether the first surviving segment spans the offset and must be cut
    pub cut_boundary: bool,
}

pub(crate) fn plan_truncate(ranges: &[(Offset, Offset)], offset: Offset) -> TruncatePlan {
    let expired = ranges
        .iter()
        .take_while(|&&(_, newest)| newest.is_before(offset))
        .count();
    let cut_boundary = ranges
        .get(expired)
        .is_some_and(|&(oldest, newest)| offset.within(oldest, newest));
    TruncatePlan {
        expired,
        cut_boundary,
    }
}
