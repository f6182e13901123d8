//! Shared helpers for workspace-level tests.

#![allow(dead_code)]

pub use segwal::*;
use std::path::Path;
use std::sync::Arc;

/// A directory sink that skips fsync, analyzed and ready to use.
pub fn directory_sink(path: &Path) -> Arc<DirectorySink> {
    let sink = DirectorySink::with_config(path, DirectorySinkConfig::for_testing())
        .expect("open directory sink");
    sink.analyze().expect("analyze");
    Arc::new(sink)
}

/// A logger over `sink` with the given segment capacity.
pub fn logger(sink: Arc<dyn Sink>, capacity: u64) -> Logger {
    Logger::new(sink, LoggerConfig::new().with_segment_capacity(capacity)).expect("logger")
}

/// Payloads that encode their own index.
pub fn payloads(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| format!("record-{i:06}").into_bytes()).collect()
}

/// Replay everything in `sink`, asserting a clean end.
pub fn replay_all(sink: Arc<dyn Sink>) -> Vec<(Offset, Vec<u8>)> {
    let mut reader: Reader = Reader::new(sink);
    let mut out = Vec::new();
    while reader.next() {
        out.push((reader.offset(), reader.data().to_vec()));
    }
    assert!(reader.error().is_none(), "replay error: {:?}", reader.error());
    out
}

/// Payloads only, in replay order.
pub fn replay_payloads(sink: Arc<dyn Sink>) -> Vec<Vec<u8>> {
    replay_all(sink).into_iter().map(|(_, p)| p).collect()
}
