//! Logger Lifecycle Tests
//!
//! Rotation, explicit and periodic flush, close and truncate, observed
//! through the sink.

use crate::common::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
fn test_two_writes_overflow_twenty_byte_segment() {
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let logger = logger(sink.clone(), 20);

    logger.write(&[b'x'; 15]).unwrap();
    assert_eq!(sink.num_segments(), 0);
    logger.write(&[b'y'; 15]).unwrap();
    assert_eq!(sink.num_segments(), 1);

    logger.close().unwrap();
    assert_eq!(
        replay_payloads(sink),
        vec![vec![b'x'; 15], vec![b'y'; 15]]
    );
}

#[test]
fn test_closed_logger_rejects_mutation() {
    let dir = TempDir::new().unwrap();
    let logger = logger(directory_sink(dir.path()), 1024);
    logger.write(b"before close").unwrap();
    logger.close().unwrap();

    assert!(matches!(logger.write(b"after"), Err(Error::LoggerClosed)));
    assert!(matches!(logger.flush(), Err(Error::LoggerClosed)));
    assert!(logger.close().is_ok());

    let mut reader = logger.new_reader();
    assert!(reader.next());
    assert_eq!(reader.data(), b"before close");
    assert!(!reader.next());
    assert!(reader.error().is_none());
}

#[test]
fn test_oversized_payload_is_rejected() {
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let logger = logger(sink, 16);
    let err = logger.write(&[0u8; 17]).unwrap_err();
    assert!(err.to_string().contains("17 bytes exceeds capacity of 16 bytes"));
}

#[test]
fn test_periodic_flush_until_close() {
    let dir = TempDir::new().unwrap();
    let sink = directory_sink(dir.path());
    let logger = Arc::new(logger(sink.clone(), 1 << 20));

    let handle = spawn_flush_interval(Arc::clone(&logger), Duration::from_millis(5), |e| {
        panic!("unexpected flush error: {e}")
    })
    .unwrap();

    logger.write(b"tick").unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while sink.num_segments() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(sink.num_segments(), 1);

    logger.close().unwrap();
    handle.join().unwrap();
    assert_eq!(replay_payloads(sink), vec![b"tick".to_vec()]);
}

#[test]
fn test_truncate_through_logger_persists() {
    let dir = TempDir::new().unwrap();
    let sink = directory_sink(dir.path());
    let logger = logger(sink.clone(), 64);
    for p in payloads(20) {
        logger.write(&p).unwrap();
    }
    logger.flush().unwrap();

    let all = replay_all(sink.clone());
    let (cut, _) = all[9];
    logger.truncate(cut).unwrap();
    logger.close().unwrap();

    let expected: Vec<_> = all.into_iter().filter(|(o, _)| o.is_after(cut)).collect();
    let reopened = directory_sink(dir.path());
    assert_eq!(replay_all(reopened), expected);
}

#[test]
fn test_reader_from_offset_matches_filtered_replay() {
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let logger = logger(sink.clone(), 48);
    for p in payloads(25) {
        logger.write(&p).unwrap();
    }
    logger.close().unwrap();

    let all = replay_all(sink);
    for start in [0usize, 1, 12, 24] {
        let (from, _) = all[start];
        let mut reader = logger.new_reader_from(from);
        let mut got = Vec::new();
        while reader.next() {
            got.push((reader.offset(), reader.data().to_vec()));
        }
        let expected: Vec<_> = all.iter().filter(|(o, _)| !o.is_before(from)).cloned().collect();
        assert_eq!(got, expected, "start index {start}");
    }
}
