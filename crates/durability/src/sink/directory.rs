//! Directory-backed sink.
//!
//! Each segment is stored as its own file, named after the offsets of its
//! first and last chunk:
//!
//! ```text
//! <oldest>-<newest>
//! 1483228800000000000-1483232400000000000
//! ```
//!
//! Next to every segment file lives `<name>.CHECKSUM`, holding the CRC-64 of
//! the segment file's bytes as 16 lowercase hex digits. [`DirectorySink::analyze`]
//! verifies every pair before trusting the directory.
//!
//! # Write protocol
//!
//! 1. stream the serialized segment through a checksumming writer into `<name>.tmp`
//! 2. write the checksum to `<name>.CHECKSUM.tmp`
//! 3. rename the checksum file into place, then the segment file
//! 4. sync the directory (when `sync_writes` is set)
//!
//! A crash part-way leaves temporary files or a checksum without a segment;
//! `analyze` skips both with a warning.

use super::{find_segment, plan_truncate, probe, Analyzer, SegmentLoader, SegmentWriter, Sink};
use crate::checksum::{format_checksum, parse_checksum, ChecksumWriter};
use parking_lot::RwLock;
use segwal_core::{Error, FormatError, Offset, Result, Segment};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix of checksum files.
pub const CHECKSUM_SUFFIX: &str = ".CHECKSUM";

/// Suffix of files that are still being written.
const TEMP_SUFFIX: &str = ".tmp";

/// Directory sink configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySinkConfig {
    /// fsync segment files, checksum files and the directory on every write
    /// (default: true).
    pub sync_writes: bool,
}

impl Default for DirectorySinkConfig {
    fn default() -> Self {
        DirectorySinkConfig { sync_writes: true }
    }
}

impl DirectorySinkConfig {
    /// Set whether writes are synced (builder pattern).
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Configuration for tests: no fsync.
    pub fn for_testing() -> Self {
        DirectorySinkConfig { sync_writes: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexEntry {
    oldest: Offset,
    newest: Offset,
    /// Segment file name, relative to the sink directory
    name: String,
}

impl IndexEntry {
    fn key(&self) -> (Offset, Offset) {
        (self.oldest, self.newest)
    }
}

/// A [`Sink`] that persists segments as files in one directory.
///
/// The index of segment ranges is held in memory. Call
/// [`analyze`](Analyzer::analyze) after opening a directory that already
/// holds segments; until then the sink only knows about segments written
/// through it.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    config: DirectorySinkConfig,
    index: RwLock<Vec<IndexEntry>>,
}

impl DirectorySink {
    /// Open `dir` with the default configuration.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(dir, DirectorySinkConfig::default())
    }

    /// Open `dir`, creating it if it does not exist.
    ///
    /// The path is made absolute first. An existing path must be a
    /// directory that can be listed and written to.
    pub fn with_config(dir: impl AsRef<Path>, config: DirectorySinkConfig) -> Result<Self> {
        let dir = absolute(dir.as_ref()).map_err(|e| e.context("new directory sink"))?;

        match probe::check_dir(&dir) {
            Ok(()) => {}
            Err(e) if probe::is_not_found(&e) => {
                fs::create_dir_all(&dir).map_err(|e| Error::io("mkdir all", &dir, e))?;
                tracing::info!(dir = %dir.display(), "created wal directory");
            }
            Err(e) => return Err(e.context("new directory sink")),
        }

        Ok(DirectorySink {
            dir,
            config,
            index: RwLock::new(Vec::new()),
        })
    }

    /// Absolute path of the sink directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The sink's configuration.
    pub fn config(&self) -> &DirectorySinkConfig {
        &self.config
    }

    /// Paths of all indexed segment files, oldest first.
    pub fn segment_paths(&self) -> Vec<PathBuf> {
        self.index
            .read()
            .iter()
            .map(|e| self.dir.join(&e.name))
            .collect()
    }

    /// File name for a segment spanning `oldest..=newest`.
    pub fn segment_file_name(oldest: Offset, newest: Offset) -> String {
        format!("{}-{}", oldest, newest)
    }

    /// Parse a segment file name back into its offsets.
    ///
    /// The separator is the first `-` after the first character, so
    /// negative oldest offsets still parse.
    pub fn parse_segment_file_name(name: &str) -> std::result::Result<(Offset, Offset), FormatError> {
        let malformed = |reason: String| FormatError::SegmentName {
            name: name.to_string(),
            reason,
        };

        let sep = name
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i)
            .ok_or_else(|| malformed("no separator".to_string()))?;

        let oldest = Offset::parse(&name[..sep])
            .map_err(|e| malformed(format!("parse starting offset: {e}")))?;
        let newest = Offset::parse(&name[sep + 1..])
            .map_err(|e| malformed(format!("parse ending offset: {e}")))?;

        if newest.is_before(oldest) {
            return Err(malformed("ending offset precedes starting offset".to_string()));
        }
        Ok((oldest, newest))
    }

    fn checksum_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{CHECKSUM_SUFFIX}"))
    }

    /// Walk the directory and build a verified, sorted index.
    fn scan(&self) -> Result<Vec<IndexEntry>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io("read dir", &self.dir, e))?;

        let mut segments = Vec::new();
        let mut checksums = BTreeSet::new();

        for entry in entries {
            let entry = entry.map_err(|e| Error::io("read dir", &self.dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| Error::io("stat", entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!(name = ?raw, "skipping file with non UTF-8 name");
                    continue;
                }
            };

            if name.starts_with('.') {
                continue;
            }
            if let Some(segment) = name.strip_suffix(CHECKSUM_SUFFIX) {
                checksums.insert(segment.to_string());
            } else if name.ends_with(TEMP_SUFFIX) {
                tracing::warn!(file = %name, "ignoring leftover temporary file");
            } else if name.contains('-') {
                segments.push(name);
            } else {
                tracing::debug!(file = %name, "ignoring non-segment file");
            }
        }

        let mut index = Vec::with_capacity(segments.len());
        for name in segments {
            checksums.remove(&name);
            self.verify_segment(&name)
                .map_err(|e| e.context("verify segment"))?;

            let (oldest, newest) = Self::parse_segment_file_name(&name)?;
            index.push(IndexEntry {
                oldest,
                newest,
                name,
            });
        }

        for orphan in checksums {
            tracing::warn!(segment = %orphan, "checksum file has no segment file");
        }

        index.sort_by_key(IndexEntry::key);
        Ok(index)
    }

    /// Compare a segment file's CRC-64 with its checksum file.
    fn verify_segment(&self, name: &str) -> Result<()> {
        let checksum_path = self.checksum_path(name);
        let text = fs::read_to_string(&checksum_path)
            .map_err(|e| Error::io("read checksum", &checksum_path, e))?;
        let expected = parse_checksum(&text).ok_or_else(|| FormatError::Checksum {
            path: checksum_path.clone(),
            reason: format!("not a hex CRC-64: {:?}", text.trim()),
        })?;

        let path = self.dir.join(name);
        let mut file = File::open(&path).map_err(|e| Error::io("open", &path, e))?;
        let mut hasher = ChecksumWriter::new(io::sink());
        io::copy(&mut file, &mut hasher).map_err(|e| Error::io("read", &path, e))?;
        let (_, actual) = hasher.finish();

        if actual != expected {
            return Err(Error::Integrity {
                path,
                expected: format_checksum(expected),
                actual: format_checksum(actual),
            });
        }
        Ok(())
    }

    fn read_segment(&self, name: &str) -> Result<Segment> {
        let path = self.dir.join(name);
        let data = fs::read(&path).map_err(|e| Error::io("open", &path, e))?;
        Segment::from_bytes(&data)
    }

    /// Write a segment file and its checksum file; returns the new index entry.
    fn persist(&self, segment: &Segment) -> Result<IndexEntry> {
        let (oldest, newest) = segment.limits();
        let name = Self::segment_file_name(oldest, newest);
        let path = self.dir.join(&name);
        let tmp = temp_path(&path);

        let file = File::create(&tmp).map_err(|e| Error::io("create", &tmp, e))?;
        let mut writer = ChecksumWriter::new(BufWriter::new(file));
        segment
            .write_to(&mut writer)
            .map_err(|e| Error::io("write", &tmp, e))?;
        let size = writer.written();
        let (buffered, sum) = writer.finish();
        let file = buffered
            .into_inner()
            .map_err(|e| Error::io("write", &tmp, e.into_error()))?;
        if self.config.sync_writes {
            file.sync_all().map_err(|e| Error::io("sync", &tmp, e))?;
        }
        drop(file);

        let checksum_path = self.checksum_path(&name);
        let checksum_tmp = temp_path(&checksum_path);
        self.write_small_file(&checksum_tmp, format_checksum(sum).as_bytes())?;

        fs::rename(&checksum_tmp, &checksum_path)
            .map_err(|e| Error::io("rename", &checksum_tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Error::io("rename", &tmp, e))?;
        if self.config.sync_writes {
            sync_dir(&self.dir)?;
        }

        tracing::debug!(
            %oldest,
            %newest,
            bytes = size,
            checksum = %format_checksum(sum),
            "wrote segment file"
        );
        Ok(IndexEntry {
            oldest,
            newest,
            name,
        })
    }

    fn write_small_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut file = File::create(path).map_err(|e| Error::io("create", path, e))?;
        file.write_all(contents)
            .map_err(|e| Error::io("write", path, e))?;
        if self.config.sync_writes {
            file.sync_all().map_err(|e| Error::io("sync", path, e))?;
        }
        Ok(())
    }

    fn delete_files(&self, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        fs::remove_file(&path).map_err(|e| Error::io("remove", &path, e))?;
        let checksum_path = self.checksum_path(name);
        fs::remove_file(&checksum_path).map_err(|e| Error::io("remove", &checksum_path, e))?;
        Ok(())
    }
}

fn ranges(index: &[IndexEntry]) -> Vec<(Offset, Offset)> {
    index.iter().map(IndexEntry::key).collect()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(TEMP_SUFFIX);
    PathBuf::from(s)
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| Error::io("resolve", dir, e))?;
    Ok(cwd.join(dir))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| Error::io("sync", dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

impl Analyzer for DirectorySink {
    /// Rebuild the index from the directory contents.
    ///
    /// Fails on the first segment whose checksum does not match
    /// ([`Error::Integrity`]), whose checksum file is missing or malformed,
    /// or whose name cannot be parsed. On failure the index is left empty.
    fn analyze(&self) -> Result<()> {
        let mut index = self.index.write();
        index.clear();
        *index = self.scan().map_err(|e| e.context("analyze"))?;
        tracing::info!(
            dir = %self.dir.display(),
            segments = index.len(),
            "analyzed wal directory"
        );
        Ok(())
    }
}

impl SegmentLoader for DirectorySink {
    fn load_segment(&self, offset: Offset) -> Result<Segment> {
        let index = self.index.read();
        let i = find_segment(&ranges(&index), offset).ok_or(Error::EndOfLog)?;
        self.read_segment(&index[i].name)
            .map_err(|e| e.context("load segment"))
    }
}

impl SegmentWriter for DirectorySink {
    fn write_segment(&self, segment: &Segment) -> Result<()> {
        if segment.is_empty() {
            return Ok(());
        }

        let mut index = self.index.write();
        let entry = self
            .persist(segment)
            .map_err(|e| e.context("write segment"))?;

        if let Some(existing) = index.iter_mut().find(|e| e.name == entry.name) {
            *existing = entry;
        } else {
            let pos = index.partition_point(|e| e.key() <= entry.key());
            index.insert(pos, entry);
        }
        Ok(())
    }
}

impl Sink for DirectorySink {
    fn offsets(&self) -> Result<(Offset, Offset)> {
        let index = self.index.read();
        match (index.first(), index.last()) {
            (Some(first), Some(last)) => Ok((first.oldest, last.newest)),
            _ => Err(Error::NoSegments),
        }
    }

    fn num_segments(&self) -> usize {
        self.index.read().len()
    }

    /// Delete expired segment files and rewrite the boundary segment.
    ///
    /// If deleting an expired segment fails, segments deleted before it are
    /// still dropped from the index and the error is returned.
    fn truncate(&self, offset: Offset) -> Result<()> {
        let mut index = self.index.write();
        let plan = plan_truncate(&ranges(&index), offset);

        let mut removed = 0;
        let mut failure = None;
        for entry in &index[..plan.expired] {
            if let Err(e) = self.delete_files(&entry.name) {
                failure = Some(e);
                break;
            }
            removed += 1;
        }
        index.drain(..removed);
        if let Some(e) = failure {
            return Err(e.context("delete segment file"));
        }

        if plan.cut_boundary {
            let old = index[0].clone();
            let segment = self
                .read_segment(&old.name)
                .map_err(|e| e.context("truncate segment"))?;
            segment.truncate(offset);

            if segment.is_empty() {
                self.delete_files(&old.name)
                    .map_err(|e| e.context("delete segment file"))?;
                index.remove(0);
            } else {
                let entry = self
                    .persist(&segment)
                    .map_err(|e| e.context("write truncated segment"))?;
                let renamed = entry.name != old.name;
                index[0] = entry;
                if renamed {
                    self.delete_files(&old.name)
                        .map_err(|e| e.context("delete segment file"))?;
                }
            }
        }

        tracing::debug!(
            %offset,
            expired = plan.expired,
            cut_boundary = plan.cut_boundary,
            remaining = index.len(),
            "truncated wal directory"
        );
        Ok(())
    }

    /// No files are held open between calls, so there is nothing to release.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segwal_core::Chunk;
    use tempfile::tempdir;

    fn o(n: i64) -> Offset {
        Offset::from_nanos(n)
    }

    fn segment(offsets: &[i64]) -> Segment {
        let seg = Segment::new(1 << 20);
        for &n in offsets {
            seg.append(Chunk::with_offset(o(n), format!("payload-{n}").into_bytes()))
                .unwrap();
        }
        seg
    }

    fn open(dir: &Path) -> DirectorySink {
        DirectorySink::with_config(dir, DirectorySinkConfig::for_testing()).unwrap()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let wal_dir = dir.path().join("a").join("wal.d");
        let sink = open(&wal_dir);
        assert!(wal_dir.is_dir());
        assert!(sink.dir().is_absolute());
        assert_eq!(sink.num_segments(), 0);
    }

    #[test]
    fn test_open_rejects_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();
        assert!(DirectorySink::open(&file).is_err());
    }

    #[test]
    fn test_default_config_syncs() {
        assert!(DirectorySinkConfig::default().sync_writes);
        assert!(!DirectorySinkConfig::for_testing().sync_writes);
        assert!(!DirectorySinkConfig::default()
            .with_sync_writes(false)
            .sync_writes);
    }

    #[test]
    fn test_segment_file_name_round_trip() {
        let name = DirectorySink::segment_file_name(o(1_483_228_800_000_000_000), o(1_483_232_400_000_000_000));
        assert_eq!(name, "1483228800000000000-1483232400000000000");
        assert_eq!(
            DirectorySink::parse_segment_file_name(&name).unwrap(),
            (o(1_483_228_800_000_000_000), o(1_483_232_400_000_000_000))
        );
        assert_eq!(
            DirectorySink::parse_segment_file_name("-5--3").unwrap(),
            (o(-5), o(-3))
        );
    }

    #[test]
    fn test_parse_segment_file_name_rejects_garbage() {
        for name in ["12", "a-b", "1-", "-1", "5-2", "1-2-3"] {
            assert!(
                DirectorySink::parse_segment_file_name(name).is_err(),
                "{name} should not parse"
            );
        }
    }

    #[test]
    fn test_write_segment_creates_files() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        let seg = segment(&[10, 20, 30]);
        sink.write_segment(&seg).unwrap();

        assert_eq!(file_names(dir.path()), vec!["10-30", "10-30.CHECKSUM"]);
        let data = fs::read(dir.path().join("10-30")).unwrap();
        assert_eq!(data.len() as u64, seg.encoded_byte_size());
        assert_eq!(data, seg.serialize());

        let recorded = fs::read_to_string(dir.path().join("10-30.CHECKSUM")).unwrap();
        assert_eq!(recorded, format_checksum(crate::checksum::checksum(&data)));
        assert_eq!(sink.offsets().unwrap(), (o(10), o(30)));
    }

    #[test]
    fn test_write_empty_segment_is_noop() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&Segment::new(10)).unwrap();
        assert!(file_names(dir.path()).is_empty());
        assert!(matches!(sink.offsets(), Err(Error::NoSegments)));
    }

    #[test]
    fn test_analyze_rebuilds_index() {
        let dir = tempdir().unwrap();
        {
            let sink = open(dir.path());
            sink.write_segment(&segment(&[30, 40])).unwrap();
            sink.write_segment(&segment(&[10, 20])).unwrap();
        }

        let sink = open(dir.path());
        assert_eq!(sink.num_segments(), 0);
        sink.analyze().unwrap();
        assert_eq!(sink.num_segments(), 2);
        assert_eq!(sink.offsets().unwrap(), (o(10), o(40)));
        let paths = sink.segment_paths();
        assert!(paths[0].ends_with("10-20"));
        assert!(paths[1].ends_with("30-40"));
    }

    #[test]
    fn test_analyze_detects_checksum_mismatch() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2])).unwrap();

        let path = dir.path().join("1-2");
        let mut data = fs::read(&path).unwrap();
        data[0] ^= 0x01;
        fs::write(&path, data).unwrap();

        let err = sink.analyze().unwrap_err();
        assert!(matches!(err.root(), Error::Integrity { .. }));
        assert!(err.to_string().contains("1-2"));
        assert_eq!(sink.num_segments(), 0);
    }

    #[test]
    fn test_analyze_rejects_malformed_checksum_file() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2])).unwrap();
        fs::write(dir.path().join("1-2.CHECKSUM"), "not hex").unwrap();

        let err = sink.analyze().unwrap_err();
        assert!(matches!(
            err.root(),
            Error::Format(FormatError::Checksum { .. })
        ));
    }

    #[test]
    fn test_analyze_rejects_missing_checksum_file() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2])).unwrap();
        fs::remove_file(dir.path().join("1-2.CHECKSUM")).unwrap();

        let err = sink.analyze().unwrap_err();
        assert!(matches!(err.root(), Error::Io { op: "read checksum", .. }));
    }

    #[test]
    fn test_analyze_rejects_malformed_segment_name() {
        let dir = tempdir().unwrap();
        let data = b"1:aGk\n";
        fs::write(dir.path().join("abc-def"), data).unwrap();
        fs::write(
            dir.path().join("abc-def.CHECKSUM"),
            format_checksum(crate::checksum::checksum(data)),
        )
        .unwrap();

        let sink = open(dir.path());
        let err = sink.analyze().unwrap_err();
        assert!(matches!(
            err.root(),
            Error::Format(FormatError::SegmentName { .. })
        ));
    }

    #[test]
    fn test_analyze_skips_leftovers_and_unrelated_files() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2])).unwrap();

        fs::write(dir.path().join("3-4.tmp"), b"partial").unwrap();
        fs::write(dir.path().join("5-6.CHECKSUM"), "00").unwrap();
        fs::write(dir.path().join("README"), b"hello").unwrap();
        fs::create_dir(dir.path().join("7-8")).unwrap();

        sink.analyze().unwrap();
        assert_eq!(sink.num_segments(), 1);
        assert_eq!(sink.offsets().unwrap(), (o(1), o(2)));
    }

    #[test]
    fn test_load_segment() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2])).unwrap();
        sink.write_segment(&segment(&[10, 20])).unwrap();

        let first = sink.load_segment(Offset::ZERO).unwrap();
        assert_eq!(first.limits(), (o(1), o(2)));
        assert!(first.next());
        assert_eq!(first.current().unwrap().payload(), b"payload-1");

        assert_eq!(sink.load_segment(o(2)).unwrap().limits(), (o(1), o(2)));
        assert_eq!(sink.load_segment(o(3)).unwrap().limits(), (o(10), o(20)));
        assert!(sink.load_segment(o(21)).unwrap_err().is_end_of_log());
    }

    #[test]
    fn test_load_from_empty_sink_is_end_of_log() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        assert!(sink.load_segment(Offset::ZERO).unwrap_err().is_end_of_log());
    }

    #[test]
    fn test_truncate_deletes_expired_files() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2])).unwrap();
        sink.write_segment(&segment(&[3, 4])).unwrap();
        sink.write_segment(&segment(&[10, 20])).unwrap();

        sink.truncate(o(5)).unwrap();
        assert_eq!(sink.num_segments(), 1);
        assert_eq!(file_names(dir.path()), vec!["10-20", "10-20.CHECKSUM"]);
    }

    #[test]
    fn test_truncate_rewrites_boundary_segment() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2, 3])).unwrap();
        sink.write_segment(&segment(&[10, 20])).unwrap();

        sink.truncate(o(2)).unwrap();
        assert_eq!(sink.offsets().unwrap(), (o(3), o(20)));
        assert_eq!(
            file_names(dir.path()),
            vec!["10-20", "10-20.CHECKSUM", "3-3", "3-3.CHECKSUM"]
        );

        // The rewritten files verify and replay.
        let fresh = open(dir.path());
        fresh.analyze().unwrap();
        assert_eq!(fresh.offsets().unwrap(), (o(3), o(20)));
        let seg = fresh.load_segment(Offset::ZERO).unwrap();
        assert_eq!(seg.chunk_count(), 1);
        assert!(seg.next());
        assert_eq!(seg.current().unwrap().payload(), b"payload-3");
    }

    #[test]
    fn test_truncate_at_newest_deletes_boundary_segment() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2, 3])).unwrap();
        sink.write_segment(&segment(&[10, 20])).unwrap();

        sink.truncate(o(3)).unwrap();
        assert_eq!(sink.num_segments(), 1);
        assert_eq!(file_names(dir.path()), vec!["10-20", "10-20.CHECKSUM"]);
    }

    #[test]
    fn test_truncate_reports_delete_failure() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.write_segment(&segment(&[1, 2])).unwrap();
        sink.write_segment(&segment(&[3, 4])).unwrap();
        sink.write_segment(&segment(&[10, 20])).unwrap();

        // Pull the second expired segment out from under the sink.
        fs::remove_file(dir.path().join("3-4")).unwrap();

        let err = sink.truncate(o(5)).unwrap_err();
        assert!(matches!(err.root(), Error::Io { op: "remove", .. }));
        // The first segment was deleted and dropped; the failed one is kept.
        assert_eq!(sink.num_segments(), 2);
        assert_eq!(sink.offsets().unwrap(), (o(3), o(20)));
    }

    #[test]
    fn test_close_is_noop() {
        let dir = tempdir().unwrap();
        let sink = open(dir.path());
        sink.close().unwrap();
        sink.write_segment(&segment(&[1])).unwrap();
        assert_eq!(sink.num_segments(), 1);
    }
}
