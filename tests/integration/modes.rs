//! Sink Mode Tests
//!
//! The same workload against both sinks must replay identically:
//! - MemorySink (nothing persisted)
//! - DirectorySink (one file per segment, verified on analyze)

use crate::common::*;
use std::sync::Arc;
use tempfile::TempDir;

fn run_workload(sink: Arc<dyn Sink>) -> Vec<Vec<u8>> {
    let logger = logger(sink.clone(), 128);
    let written = payloads(40);
    for p in &written {
        logger.write(p).unwrap();
    }
    logger.close().unwrap();
    assert!(sink.num_segments() > 1);
    written
}

#[test]
fn test_memory_sink_replays_in_write_order() {
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let written = run_workload(sink.clone());
    assert_eq!(replay_payloads(sink), written);
}

#[test]
fn test_directory_sink_replays_in_write_order() {
    let dir = TempDir::new().unwrap();
    let sink: Arc<dyn Sink> = directory_sink(dir.path());
    let written = run_workload(sink.clone());
    assert_eq!(replay_payloads(sink), written);
}

#[test]
fn test_sinks_agree_on_offsets_and_segments() {
    let dir = TempDir::new().unwrap();
    let memory: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let directory: Arc<dyn Sink> = directory_sink(dir.path());

    // Feed both sinks the exact same segments.
    let source = Segment::new(1 << 20);
    for p in payloads(10) {
        source.write(&p).unwrap();
    }
    let chunks = source.chunks();
    for pair in chunks.chunks(3) {
        let segment = Segment::from_chunks(1 << 20, pair.iter().cloned());
        memory.write_segment(&segment).unwrap();
        directory.write_segment(&segment).unwrap();
    }

    assert_eq!(memory.num_segments(), 4);
    assert_eq!(directory.num_segments(), 4);
    assert_eq!(memory.offsets().unwrap(), directory.offsets().unwrap());
    assert_eq!(replay_all(memory), replay_all(directory));
}

#[test]
fn test_directory_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let written = run_workload(directory_sink(dir.path()));

    let reopened = directory_sink(dir.path());
    assert!(reopened.num_segments() > 1);
    assert_eq!(replay_payloads(reopened), written);
}

#[test]
fn test_unanalyzed_directory_looks_empty() {
    let dir = TempDir::new().unwrap();
    run_workload(directory_sink(dir.path()));

    let fresh = DirectorySink::with_config(dir.path(), DirectorySinkConfig::for_testing()).unwrap();
    assert_eq!(fresh.num_segments(), 0);
    assert!(matches!(fresh.offsets(), Err(Error::NoSegments)));
}
