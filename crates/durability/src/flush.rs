//! Periodic flushing.
//!
//! Segments only reach the sink when they fill up or when someone calls
//! [`Logger::flush`]. These helpers bound how long a write can sit in the
//! active segment by flushing on a timer until the logger is closed.

use crate::logger::Logger;
use segwal_core::Error;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Flush `logger` every `interval` until it reports [`Error::LoggerClosed`].
///
/// Blocks the calling thread. Any other flush error is logged, passed to
/// `on_error`, and the loop carries on.
pub fn flush_interval<F>(logger: &Logger, interval: Duration, mut on_error: F)
where
    F: FnMut(Error),
{
    loop {
        thread::sleep(interval);
        match logger.flush() {
            Ok(()) => {}
            Err(e) if e.is_logger_closed() => {
                tracing::debug!("logger closed, stopping periodic flush");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "periodic flush failed");
                on_error(e);
            }
        }
    }
}

/// Run [`flush_interval`] on a background thread named `segwal-wal-flush`.
///
/// The thread exits on its own once the logger is closed.
pub fn spawn_flush_interval<F>(
    logger: Arc<Logger>,
    interval: Duration,
    on_error: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnMut(Error) + Send + 'static,
{
    thread::Builder::new()
        .name("segwal-wal-flush".to_string())
        .spawn(move || flush_interval(&logger, interval, on_error))
}
