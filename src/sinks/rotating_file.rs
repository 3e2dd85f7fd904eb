//! Rotating file sink
//!
//! Writes records to a file and rotates it by size, elapsed time, wall-clock
//! day, or a size/time hybrid. Rotated files are kept as numbered backups
//! next to the active file (`app.log.1`, `app.log.2`, ...), optionally gzip
//! compressed (`app.log.1.gz`).

use crate::core::error::{LoggerError, Result};
use crate::core::sink::Sink;
use chrono::{DateTime, Local, Timelike};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const BYTES_PER_MB: u64 = 1024 * 1024;
const COMPRESS_CHUNK: usize = 64 * 1024;
const MAX_DELETION_FAILURES: usize = 5;

/// When the active file is rotated.
///
/// # Examples
///
/// ```
/// use rust_trace_logger::sinks::RotationStrategy;
/// use std::time::Duration;
///
/// let by_size = RotationStrategy::size_mb(100);
/// let nightly = RotationStrategy::daily(0);
/// let either = RotationStrategy::hybrid(50 * 1024 * 1024, Duration::from_secs(24 * 3600));
/// # let _ = (by_size, nightly, either);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RotationStrategy {
    /// Rotate before a write would push the file past `max_bytes`
    Size { max_bytes: u64 },

    /// Rotate once `interval` has elapsed since the last rotation
    Time { interval: Duration },

    /// Rotate on the first write of a new day at or after `hour` (0-23, local time)
    Daily { hour: u8 },

    /// Rotate on size or time, whichever comes first
    Hybrid { max_bytes: u64, interval: Duration },

    /// Never rotate
    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Size {
            max_bytes: 10 * BYTES_PER_MB,
        }
    }
}

impl RotationStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationStrategy::Size { max_bytes }
    }

    #[must_use]
    pub fn size_mb(max_mb: u64) -> Self {
        RotationStrategy::Size {
            max_bytes: max_mb.saturating_mul(BYTES_PER_MB),
        }
    }

    #[must_use]
    pub fn time(interval: Duration) -> Self {
        RotationStrategy::Time { interval }
    }

    /// Hours above 23 are clamped to 23.
    #[must_use]
    pub fn daily(hour: u8) -> Self {
        RotationStrategy::Daily { hour: hour.min(23) }
    }

    #[must_use]
    pub fn hybrid(max_bytes: u64, interval: Duration) -> Self {
        RotationStrategy::Hybrid { max_bytes, interval }
    }

    #[must_use]
    pub fn never() -> Self {
        RotationStrategy::Never
    }

    fn max_bytes(&self) -> Option<u64> {
        match self {
            RotationStrategy::Size { max_bytes } | RotationStrategy::Hybrid { max_bytes, .. } => {
                Some(*max_bytes)
            }
            _ => None,
        }
    }
}

/// Rotation settings for [`RotatingFileSink`].
///
/// ```
/// use rust_trace_logger::sinks::{RotationPolicy, RotationStrategy};
///
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::size_mb(50))
///     .with_max_backups(7)
///     .with_compression(true);
/// assert_eq!(policy.max_file_size(), Some(50 * 1024 * 1024));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RotationPolicy {
    pub strategy: RotationStrategy,

    /// Number of rotated files kept; 0 discards the file on rotation and
    /// [`UNLIMITED_BACKUPS`](Self::UNLIMITED_BACKUPS) never deletes any
    pub max_backup_files: usize,

    /// Gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            max_backup_files: 5,
            compress: false,
        }
    }
}

impl RotationPolicy {
    pub const UNLIMITED_BACKUPS: usize = usize::MAX;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    /// Keep every rotated file.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_unlimited_backups(self) -> Self {
        self.with_max_backups(Self::UNLIMITED_BACKUPS)
    }

    #[must_use]
    pub fn keeps_all_backups(&self) -> bool {
        self.max_backup_files == Self::UNLIMITED_BACKUPS
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Size limit in bytes, if the strategy has one.
    #[must_use]
    pub fn max_file_size(&self) -> Option<u64> {
        self.strategy.max_bytes()
    }
}

struct FileState {
    writer: Option<BufWriter<File>>,
    current_size: u64,
    last_rotation: SystemTime,
    deletion_failure_count: usize,
}

/// File sink with automatic rotation.
///
/// ```no_run
/// use rust_trace_logger::sinks::{RotatingFileSink, RotationPolicy, RotationStrategy};
///
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::daily(0))
///     .with_max_backups(7)
///     .with_compression(true);
/// let sink = RotatingFileSink::with_policy("/var/log/app.log", policy).unwrap();
/// ```
pub struct RotatingFileSink {
    base_path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<FileState>,
}

impl RotatingFileSink {
    /// Open `path` with the default policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be created.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Open `path`, appending to an existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be created.
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, last_rotation) = open_append(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            state: Mutex::new(FileState {
                writer: Some(BufWriter::new(file)),
                current_size,
                last_rotation,
                deletion_failure_count: 0,
            }),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the active file, including what it held when opened.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    /// Path of backup number `index` as it exists on disk after rotation.
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        if self.policy.compress {
            self.compressed_path(index)
        } else {
            self.plain_backup_path(index)
        }
    }

    fn plain_backup_path(&self, index: usize) -> PathBuf {
        suffixed(&self.base_path, &index.to_string())
    }

    fn compressed_path(&self, index: usize) -> PathBuf {
        suffixed(&self.base_path, &format!("{}.gz", index))
    }

    fn should_rotate(&self, state: &FileState, incoming: u64) -> bool {
        let elapsed = || {
            SystemTime::now()
                .duration_since(state.last_rotation)
                .unwrap_or(Duration::ZERO)
        };
        let size_exceeded =
            |max: u64| state.current_size > 0 && state.current_size + incoming > max;

        match &self.policy.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size { max_bytes } => size_exceeded(*max_bytes),
            RotationStrategy::Time { interval } => elapsed() >= *interval,
            RotationStrategy::Daily { hour } => {
                let now: DateTime<Local> = SystemTime::now().into();
                let last: DateTime<Local> = state.last_rotation.into();
                now.date_naive() != last.date_naive() && now.hour() >= u32::from(*hour)
            }
            RotationStrategy::Hybrid { max_bytes, interval } => {
                size_exceeded(*max_bytes) || elapsed() >= *interval
            }
        }
    }

    fn rotate(&self, state: &mut FileState) -> Result<()> {
        let display = self.base_path.display().to_string();

        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    display.clone(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let keep = self.policy.max_backup_files;
        if keep == 0 {
            if self.base_path.exists() {
                fs::remove_file(&self.base_path).map_err(|e| {
                    LoggerError::file_rotation(
                        display.clone(),
                        format!("Failed to discard log file: {}", e),
                    )
                })?;
            }
        } else if self.policy.keeps_all_backups() {
            self.shift_backups(self.highest_backup() + 1)?;
        } else {
            self.remove_oldest(state, keep)?;
            self.shift_backups(keep)?;

            let first = self.plain_backup_path(1);
            if self.base_path.exists() {
                fs::rename(&self.base_path, &first).map_err(|e| {
                    LoggerError::file_rotation(
                        display.clone(),
                        format!("Failed to rotate current log file: {}", e),
                    )
                })?;
                if self.policy.compress {
                    compress_file(&first, &self.compressed_path(1))?;
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.base_path)
            .map_err(|e| {
                LoggerError::file_rotation(
                    display.clone(),
                    format!("Failed to create new log file: {}", e),
                )
            })?;

        state.writer = Some(BufWriter::new(file));
        state.current_size = 0;
        state.last_rotation = SystemTime::now();
        Ok(())
    }

    /// Delete the backup that would fall off the end. Repeated failures abort
    /// rotation so the directory does not grow without bound.
    fn remove_oldest(&self, state: &mut FileState, keep: usize) -> Result<()> {
        let mut failed = false;
        for oldest in [self.compressed_path(keep), self.plain_backup_path(keep)] {
            if !oldest.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(&oldest) {
                failed = true;
                eprintln!(
                    "[LOGGER WARNING] Failed to remove oldest backup {}: {} (failure #{}/{})",
                    oldest.display(),
                    e,
                    state.deletion_failure_count + 1,
                    MAX_DELETION_FAILURES
                );
            }
        }

        if !failed {
            state.deletion_failure_count = 0;
            return Ok(());
        }

        state.deletion_failure_count += 1;
        if state.deletion_failure_count >= MAX_DELETION_FAILURES {
            return Err(LoggerError::file_rotation(
                self.base_path.display().to_string(),
                format!(
                    "Rotation aborted: failed to delete old backup files {} consecutive times",
                    state.deletion_failure_count
                ),
            ));
        }
        Ok(())
    }

    /// Index of the last backup in the unbroken run `1..=n` on disk, or 0.
    fn highest_backup(&self) -> usize {
        let mut index = 0;
        while self.compressed_path(index + 1).exists() || self.plain_backup_path(index + 1).exists()
        {
            index += 1;
        }
        index
    }

    /// Move backup `i` to `i + 1` for every `i` below `keep`.
    fn shift_backups(&self, keep: usize) -> Result<()> {
        for i in (1..keep).rev() {
            for (from, to) in [
                (self.compressed_path(i), self.compressed_path(i + 1)),
                (self.plain_backup_path(i), self.plain_backup_path(i + 1)),
            ] {
                if !from.exists() {
                    continue;
                }
                if fs::rename(&from, &to).is_err() {
                    // Some platforms refuse to rename over an existing file.
                    let _ = fs::remove_file(&to);
                    fs::rename(&from, &to).map_err(|e| {
                        LoggerError::file_rotation(
                            from.display().to_string(),
                            format!("Failed to rotate backup files: {}", e),
                        )
                    })?;
                }
            }
        }
        Ok(())
    }

    fn recover_after_failed_rotation(&self, state: &mut FileState) -> Result<()> {
        if state.writer.is_none() {
            let (file, _, last_rotation) = open_append(&self.base_path)?;
            state.writer = Some(BufWriter::new(file));
            state.last_rotation = last_rotation;
        }
        // Let the file outgrow its limit instead of retrying on every write.
        state.current_size = 0;
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn write(&self, record: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let incoming = record.len() as u64;

        if self.should_rotate(&state, incoming) {
            if let Err(e) = self.rotate(&mut state) {
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                    e
                );
                if let Err(reopen) = self.recover_after_failed_rotation(&mut state) {
                    eprintln!(
                        "[LOGGER ERROR] Failed to reopen log file after rotation failure: {}",
                        reopen
                    );
                    return Err(e);
                }
            }
        }

        let writer = state
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer.write_all(record).map_err(|e| {
            LoggerError::file_sink(
                self.base_path.display().to_string(),
                format!("Failed to write record: {}", e),
            )
        })?;
        state.current_size += incoming;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(writer) = self.state.lock().writer.as_mut() {
            writer.flush().map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.state.get_mut().writer.take() {
            let _ = writer.flush();
        }
    }
}

impl std::fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileSink")
            .field("path", &self.base_path)
            .field("policy", &self.policy)
            .finish()
    }
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app.log");
    path.with_file_name(format!("{}.{}", name, suffix))
}

fn open_append(path: &Path) -> Result<(File, u64, SystemTime)> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
        })?;

    let metadata = file.metadata().map_err(|e| {
        LoggerError::file_sink(
            path.display().to_string(),
            format!("Cannot access file metadata: {}", e),
        )
    })?;
    let last_rotation = metadata.modified().unwrap_or_else(|_| SystemTime::now());
    Ok((file, metadata.len(), last_rotation))
}

/// Gzip `source` into `target` via a temporary file; `source` is removed only
/// once the compressed file is complete.
fn compress_file(source: &Path, target: &Path) -> Result<()> {
    let temp = suffixed(target, "tmp");
    let io_err = |detail: String, e: std::io::Error| {
        let _ = fs::remove_file(&temp);
        LoggerError::io_operation("compress log file", detail, e)
    };

    let input = File::open(source)
        .map_err(|e| io_err(format!("Failed to open {}", source.display()), e))?;
    let mut reader = BufReader::with_capacity(COMPRESS_CHUNK, input);

    let output = File::create(&temp)
        .map_err(|e| io_err(format!("Failed to create {}", temp.display()), e))?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(COMPRESS_CHUNK, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; COMPRESS_CHUNK];
    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|e| io_err(format!("Failed to read {}", source.display()), e))?;
        if read == 0 {
            break;
        }
        encoder
            .write_all(&buffer[..read])
            .map_err(|e| io_err("Failed to compress data chunk".to_string(), e))?;
    }

    let mut inner = encoder
        .finish()
        .map_err(|e| io_err("Failed to finish compression".to_string(), e))?;
    inner
        .flush()
        .map_err(|e| io_err("Failed to flush compressed file".to_string(), e))?;
    drop(inner);

    fs::rename(&temp, target)
        .map_err(|e| io_err(format!("Failed to rename to {}", target.display()), e))?;

    if let Err(e) = fs::remove_file(source) {
        eprintln!(
            "[LOGGER WARNING] Compressed {} but failed to remove the original: {}",
            source.display(),
            e
        );
    }
    Ok(())
}
