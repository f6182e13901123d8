//! In-memory sink.

use super::{find_segment, plan_truncate, Analyzer, SegmentLoader, SegmentWriter, Sink};
use parking_lot::RwLock;
use segwal_core::{Error, Offset, Result, Segment};

/// A [`Sink`] that keeps segments in process memory.
///
/// Nothing survives the process. Useful for tests and for callers that
/// only need bounded in-memory buffering with replay.
#[derive(Debug, Default)]
pub struct MemorySink {
    segments: RwLock<Vec<Segment>>,
}

impl MemorySink {
    /// Create an empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn ranges(segments: &[Segment]) -> Vec<(Offset, Offset)> {
        segments.iter().map(Segment::limits).collect()
    }
}

impl Analyzer for MemorySink {
    fn analyze(&self) -> Result<()> {
        Ok(())
    }
}

impl SegmentLoader for MemorySink {
    fn load_segment(&self, offset: Offset) -> Result<Segment> {
        let segments = self.segments.read();
        find_segment(&Self::ranges(&segments), offset)
            .map(|i| segments[i].clone())
            .ok_or(Error::EndOfLog)
    }
}

impl SegmentWriter for MemorySink {
    fn write_segment(&self, segment: &Segment) -> Result<()> {
        if segment.is_empty() {
            return Ok(());
        }
        let (oldest, newest) = segment.limits();
        self.segments.write().push(segment.clone());
        tracing::debug!(%oldest, %newest, "stored segment in memory");
        Ok(())
    }
}

impl Sink for MemorySink {
    fn offsets(&self) -> Result<(Offset, Offset)> {
        let segments = self.segments.read();
        match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => Ok((first.limits().0, last.limits().1)),
            _ => Err(Error::NoSegments),
        }
    }

    fn num_segments(&self) -> usize {
        self.segments.read().len()
    }

    fn truncate(&self, offset: Offset) -> Result<()> {
        let mut segments = self.segments.write();
        let plan = plan_truncate(&Self::ranges(&segments), offset);

        segments.drain(..plan.expired);
        if plan.cut_boundary {
            segments[0].truncate(offset);
            if segments[0].is_empty() {
                segments.remove(0);
            }
        }

        tracing::debug!(
            %offset,
            expired = plan.expired,
            cut_boundary = plan.cut_boundary,
            remaining = segments.len(),
            "truncated memory sink"
        );
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
