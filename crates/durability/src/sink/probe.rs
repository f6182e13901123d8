//! Directory permission probe.
//!
//! Used when a [`DirectorySink`](super::DirectorySink) is constructed to make
//! sure its directory exists and can be listed and written to.

use segwal_core::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Check that `dir` exists, is a directory, and is readable and writable.
///
/// Readability is checked by listing the directory, writability by
/// creating and removing an empty probe file. A missing directory is
/// reported as an [`Error::Io`] whose source has kind
/// [`io::ErrorKind::NotFound`].
pub fn check_dir(dir: &Path) -> Result<()> {
    let meta = fs::metadata(dir).map_err(|e| Error::io("stat", dir, e))?;
    if !meta.is_dir() {
        return Err(Error::io(
            "stat",
            dir,
            io::Error::new(io::ErrorKind::Other, "not a directory"),
        ));
    }

    fs::read_dir(dir).map_err(|e| Error::io("read dir", dir, e))?;

    let probe = dir.join(format!(".segwal-probe-{}", std::process::id()));
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe)
        .map_err(|e| Error::io("check write permissions", &probe, e))?;
    fs::remove_file(&probe).map_err(|e| Error::io("remove", &probe, e))?;

    Ok(())
}

/// Whether `err` is the probe's report of a missing directory.
pub fn is_not_found(err: &Error) -> bool {
    matches!(err.root(), Error::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
}
