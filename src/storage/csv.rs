//! CSV-backed feedback store
//!
//! One header row, then one fixed-column row per record:
//! `timestamp,user_rating,user_review,ai_response,ai_summary,ai_recommended_action`.
//!
//! Appends never rewrite the file. Each row is encoded in memory first and
//! written with a single `write_all` through an append-mode handle. Two locks
//! guard the file: the store's async mutex orders callers sharing one handle,
//! and an advisory `flock` on the file itself orders separate handles and
//! separate processes (the server and the CLI commands). Appends take the
//! file lock exclusively and reads take it shared. A failed write truncates
//! the file back to its prior length so no half-written row survives.

use crate::error::{FeedbackError, Result};
use crate::storage::FeedbackStore;
use crate::types::{FeedbackRecord, ENRICHMENT_UNAVAILABLE};
use async_trait::async_trait;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// File-backed store
pub struct CsvFeedbackStore {
    path: PathBuf,
    sentinel: String,
    lock: Arc<Mutex<()>>,
}

impl CsvFeedbackStore {
    /// Open a store at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sentinel: ENRICHMENT_UNAVAILABLE.to_string(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Text that blank enrichment cells in older rows read back as.
    /// Blank values are ignored.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        let sentinel = sentinel.into();
        if sentinel.trim().is_empty() {
            warn!("Ignoring blank enrichment sentinel, keeping {:?}", self.sentinel);
        } else {
            self.sentinel = sentinel;
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FeedbackStore for CsvFeedbackStore {
    async fn append(&self, record: &FeedbackRecord) -> Result<()> {
        record.validate()?;

        let guard = self.lock.clone().lock_owned().await;
        let path = self.path.clone();
        let record = record.clone();

        // The blocking task owns the guard, so a dropped caller cannot stop
        // a write halfway or release the lock early.
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            append_row(&path, &record)
        })
        .await
        .map_err(|e| FeedbackError::storage(format!("append task failed: {}", e)))?
    }

    async fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        let guard = self.lock.clone().lock_owned().await;
        let path = self.path.clone();
        let sentinel = self.sentinel.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            read_file(&path, &sentinel)
        })
        .await
        .map_err(|e| FeedbackError::storage(format!("read task failed: {}", e)))?
    }
}

/// Block until `file` carries the advisory lock `arg`
fn lock_file(file: File, arg: FlockArg, path: &Path) -> Result<Flock<File>> {
    Flock::lock(file, arg)
        .map_err(|(_, errno)| FeedbackError::storage(format!("lock {}: {}", path.display(), errno)))
}

fn append_row(path: &Path, record: &FeedbackRecord) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            FeedbackError::storage(format!("create {}: {}", parent.display(), e))
        })?;
    }

    let file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| FeedbackError::storage(format!("open {}: {}", path.display(), e)))?;

    // Held until the row is committed or rolled back
    let mut file = lock_file(file, FlockArg::LockExclusive, path)?;

    let prev_len = file
        .metadata()
        .map_err(|e| FeedbackError::storage(format!("stat {}: {}", path.display(), e)))?
        .len();

    let mut bytes = Vec::new();
    if prev_len > 0 && !ends_with_newline(&mut file, prev_len)? {
        bytes.push(b'\n');
    }
    bytes.extend(encode(std::slice::from_ref(record), prev_len == 0)?);

    commit(&mut *file, &bytes, prev_len, path)?;

    debug!("Appended feedback row to {}", path.display());
    Ok(())
}

/// The two file operations an append depends on
trait AppendTarget {
    /// Write every byte at the end and flush it to disk
    fn write_durably(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Cut the target back to `len` bytes
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl AppendTarget for File {
    fn write_durably(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.sync_data()
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write `bytes`, or leave the target at `prev_len` and report why not
fn commit<T: AppendTarget>(target: &mut T, bytes: &[u8], prev_len: u64, path: &Path) -> Result<()> {
    let Err(e) = target.write_durably(bytes) else {
        return Ok(());
    };

    error!("Append to {} failed: {}", path.display(), e);
    if let Err(rollback) = target.truncate_to(prev_len) {
        return Err(FeedbackError::storage(format!(
            "append to {} failed ({}) and rollback failed ({}); file may hold a partial row",
            path.display(),
            e,
            rollback
        )));
    }
    Err(FeedbackError::storage(format!(
        "append to {}: {}",
        path.display(),
        e
    )))
}

fn ends_with_newline(file: &mut File, len: u64) -> Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))
        .and_then(|_| file.read_exact(&mut last))
        .map_err(FeedbackError::storage)?;
    Ok(last[0] == b'\n')
}

fn read_file(path: &Path, sentinel: &str) -> Result<Vec<FeedbackRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist yet, no feedback stored", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(FeedbackError::storage(format!(
                "open {}: {}",
                path.display(),
                e
            )))
        }
    };

    let file = lock_file(file, FlockArg::LockShared, path)?;
    parse_records_with_sentinel(&*file, sentinel)
}

/// Encode records as CSV, optionally preceded by the header row
fn encode(records: &[FeedbackRecord], with_header: bool) -> Result<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if with_header {
        writer.write_record(FeedbackRecord::COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }

    writer.into_inner().map_err(|e| FeedbackError::storage(e.error()))
}

/// Render records as a store-compatible CSV blob, header included
pub fn export_records(records: &[FeedbackRecord]) -> Result<Vec<u8>> {
    encode(records, true)
}

/// Parse a store-format CSV blob, reading blank enrichment cells as
/// [`ENRICHMENT_UNAVAILABLE`]
pub fn parse_records<R: Read>(input: R) -> Result<Vec<FeedbackRecord>> {
    parse_records_with_sentinel(input, ENRICHMENT_UNAVAILABLE)
}

/// Parse a store-format CSV blob
///
/// An empty input is an empty store. Blank enrichment cells, which older
/// rows may carry, read back as `sentinel`. A wrong header or a row that
/// breaks a record invariant is reported with its line number.
pub fn parse_records_with_sentinel<R: Read>(input: R, sentinel: &str) -> Result<Vec<FeedbackRecord>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    if !headers.iter().eq(FeedbackRecord::COLUMNS) {
        return Err(FeedbackError::storage(format!(
            "unexpected header: {:?}",
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<FeedbackRecord>() {
        let mut record = row?;
        record.fill_blank_enrichment(sentinel);
        record.validate().map_err(|e| {
            FeedbackError::storage(format!("corrupt row {}: {}", records.len() + 2, e))
        })?;
        records.push(record);
    }
    Ok(records)
}
