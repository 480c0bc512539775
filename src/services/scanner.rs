//! Background asset scanner.
//!
//! An [`AssetScanner`] is bound to one directory. [`start()`](AssetScanner::start)
//! walks that directory tree on a dedicated worker thread, runs the
//! [matcher](crate::services::matcher) for every `.name` file it finds and hands
//! each resulting [`AssetGroup`] to the registered [`ScanSink`]s immediately, one
//! emission per base name.
//!
//! # State machine
//!
//! `Idle -> Running -> {Finished | Cancelled}`, restartable from either terminal
//! state. Only one walk may run per scanner at a time: callers must
//! [`stop()`](AssetScanner::stop) and join before starting again.
//!
//! # Cancellation
//!
//! [`stop()`](AssetScanner::stop) sets a flag that the walker checks before each
//! directory and before each name-marker file. A cancelled walk never calls
//! [`ScanSink::scan_finished`]; groups already emitted stay emitted.
//!
//! # Rescan throttling
//!
//! The scanner does not throttle itself. Callers consult a [`RescanPolicy`]
//! against [`last_scan_timestamp()`](AssetScanner::last_scan_timestamp).

use crate::errors::Result;
use crate::models::asset::{AssetGroup, is_name_marker};
use crate::services::classifier::validate_directory;
use crate::services::matcher::{join_siblings, match_asset_files};
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use walkdir::WalkDir;

const LOG_TARGET: &str = crate::logging::SCANNER_TARGET;

/// Lifecycle of a scanner instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Running,
    Finished,
    Cancelled,
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Finished | ScanStatus::Cancelled)
    }
}

/// Event delivered to channel subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// A base-name file was discovered and grouped
    AssetFound(AssetGroup),

    /// The walk completed without cancellation
    ScanFinished { root: Utf8PathBuf, groups: usize },
}

/// Receiver of scanner emissions.
///
/// Called on the scanner's worker thread; implementations must only do cheap,
/// thread-safe work such as pushing to a queue.
#[cfg_attr(test, mockall::automock)]
pub trait ScanSink: Send + Sync {
    fn asset_found(&self, group: &AssetGroup);

    fn scan_finished(&self, _root: &Utf8Path, _groups: usize) {}
}

impl ScanSink for mpsc::UnboundedSender<ScanEvent> {
    fn asset_found(&self, group: &AssetGroup) {
        // It's OK if no one is listening
        let _ = self.send(ScanEvent::AssetFound(group.clone()));
    }

    fn scan_finished(&self, root: &Utf8Path, groups: usize) {
        let _ = self.send(ScanEvent::ScanFinished {
            root: root.to_path_buf(),
            groups,
        });
    }
}

/// Caller-owned policy for the minimum interval between two scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescanPolicy {
    cooldown: Duration,
}

impl RescanPolicy {
    /// Default cooldown between scans of the same directory
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(120);

    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// A directory that was never scanned (`last_scan == 0`) may always be scanned.
    pub fn should_rescan(&self, last_scan: u64, now: u64) -> bool {
        last_scan == 0 || now.saturating_sub(last_scan) >= self.cooldown.as_secs()
    }
}

impl Default for RescanPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COOLDOWN)
    }
}

/// Seconds since the Unix epoch
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

struct ScannerShared {
    root: Utf8PathBuf,
    cancel_requested: AtomicBool,
    status: Mutex<ScanStatus>,
    last_scan_timestamp: AtomicU64,
    sinks: Mutex<Vec<Arc<dyn ScanSink>>>,
}

/// Cancellable directory walker bound to one directory.
///
/// Cloning is cheap and every clone controls the same scan.
#[derive(Clone)]
pub struct AssetScanner {
    shared: Arc<ScannerShared>,
}

impl AssetScanner {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            shared: Arc::new(ScannerShared {
                root: root.into(),
                cancel_requested: AtomicBool::new(false),
                status: Mutex::new(ScanStatus::Idle),
                last_scan_timestamp: AtomicU64::new(0),
                sinks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Directory this scanner walks
    pub fn root(&self) -> &Utf8Path {
        &self.shared.root
    }

    /// Register a sink for all future scans
    pub fn add_sink(&self, sink: Arc<dyn ScanSink>) {
        self.shared.sinks.lock().push(sink);
    }

    /// Subscribe to scan events through a channel
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ScanEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.add_sink(Arc::new(tx));
        rx
    }

    pub fn status(&self) -> ScanStatus {
        *self.shared.status.lock()
    }

    pub fn is_running(&self) -> bool {
        self.status() == ScanStatus::Running
    }

    /// Unix seconds at which the last scan started, or 0 if never scanned
    pub fn last_scan_timestamp(&self) -> u64 {
        self.shared.last_scan_timestamp.load(Ordering::Acquire)
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.shared.cancel_requested.load(Ordering::Acquire)
    }

    /// Request cooperative cancellation of the running walk
    pub fn stop(&self) {
        self.shared.cancel_requested.store(true, Ordering::Release);
        tracing::info!(target: LOG_TARGET, "Scan stop requested for {}", self.shared.root);
    }

    /// Start a walk on a new worker thread.
    ///
    /// Precondition: no walk is running on this scanner.
    ///
    /// # Errors
    /// [`InvalidDirectoryPath`](crate::errors::ModError::InvalidDirectoryPath) if the
    /// bound directory does not exist, or an I/O error if the thread cannot be spawned.
    pub fn start(&self) -> Result<JoinHandle<ScanStatus>> {
        self.begin()?;

        let scanner = self.clone();
        let handle = std::thread::Builder::new()
            .name("asset-scanner".to_string())
            .spawn(move || scanner.walk())
            .inspect_err(|_| self.set_status(ScanStatus::Idle))?;

        Ok(handle)
    }

    /// Run a walk to completion on the calling thread
    pub fn run(&self) -> Result<ScanStatus> {
        self.begin()?;
        Ok(self.walk())
    }

    fn begin(&self) -> Result<()> {
        validate_directory(&self.shared.root)?;

        self.shared.cancel_requested.store(false, Ordering::Release);
        self.shared
            .last_scan_timestamp
            .store(unix_timestamp().max(1), Ordering::Release);
        self.set_status(ScanStatus::Running);

        tracing::info!(target: LOG_TARGET, "Scan started: {}", self.shared.root);
        Ok(())
    }

    fn set_status(&self, status: ScanStatus) {
        *self.shared.status.lock() = status;
    }

    fn cancelled(&self) -> ScanStatus {
        tracing::warn!(target: LOG_TARGET, "Scan cancelled: {}", self.shared.root);
        self.set_status(ScanStatus::Cancelled);
        ScanStatus::Cancelled
    }

    fn walk(&self) -> ScanStatus {
        let root = &self.shared.root;
        let sinks: Vec<Arc<dyn ScanSink>> = self.shared.sinks.lock().clone();
        let mut emitted = 0usize;

        let directories = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.file_type().is_dir());

        for entry in directories {
            if self.is_cancel_requested() {
                return self.cancelled();
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(target: LOG_TARGET, "Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let Some(directory) = Utf8Path::from_path(entry.path()) else {
                tracing::warn!(target: LOG_TARGET, "Skipping non UTF-8 directory: {}", entry.path().display());
                continue;
            };

            let files = match list_files(directory) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!(target: LOG_TARGET, "Failed to list {}: {}", directory, e);
                    continue;
                }
            };

            let name_files: Vec<&String> = files.iter().filter(|file| is_name_marker(file)).collect();
            if name_files.is_empty() {
                continue;
            }

            let siblings = join_siblings(&files);
            for name_file in name_files {
                if self.is_cancel_requested() {
                    return self.cancelled();
                }

                let group = match_asset_files(name_file, &siblings).with_directory(directory);
                tracing::info!(target: LOG_TARGET, "Found asset file: {}", directory.join(name_file));

                for sink in &sinks {
                    sink.asset_found(&group);
                }
                emitted += 1;
            }
        }

        for sink in &sinks {
            sink.scan_finished(root, emitted);
        }
        self.set_status(ScanStatus::Finished);

        tracing::info!(target: LOG_TARGET, "Scan finished: {} ({} assets)", root, emitted);
        ScanStatus::Finished
    }
}

/// Names of the non-directory entries directly inside `directory`
fn list_files(directory: &Utf8Path) -> std::io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            files.push(name);
        }
    }
    Ok(files)
}
