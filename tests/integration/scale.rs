//! Scale Tests
//!
//! Many segments and many concurrent writers.

use crate::common::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_1k_writes_many_segments() {
    let dir = TempDir::new().unwrap();
    let sink = directory_sink(dir.path());
    let logger = logger(sink.clone(), 256);

    let written = payloads(1_000);
    for p in &written {
        logger.write(p).unwrap();
    }
    logger.close().unwrap();

    assert!(sink.num_segments() >= 100);
    let replayed = replay_all(directory_sink(dir.path()));
    assert_eq!(replayed.len(), 1_000);
    assert!(replayed.windows(2).all(|w| !w[1].0.is_before(w[0].0)));
    let payloads: Vec<_> = replayed.into_iter().map(|(_, p)| p).collect();
    assert_eq!(payloads, written);
}

#[test]
fn test_concurrent_writers_lose_nothing() {
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let logger = Arc::new(logger(sink.clone(), 200));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..250 {
                    logger.write(format!("t{t}-{i}").as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    logger.close().unwrap();

    let seen: HashSet<Vec<u8>> = replay_payloads(sink).into_iter().collect();
    assert_eq!(seen.len(), 2_000);
    assert_eq!(logger.counters().writes, 2_000);
}
