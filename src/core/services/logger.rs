use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, Receiver};

use crate::core::errors::{Result, VerseError};
use crate::core::models::log_entry::{LogEntry, LogLevel, Metadata};
use crate::core::services::log_mirror::{LogMirror, MirrorFailure};
use crate::core::traits::console::ConsoleSink;
use crate::core::traits::kv_store::KeyValueStore;

/// Maximum number of entries kept in memory and in the archive.
pub const LOG_CAPACITY: usize = 1000;

/// Store key holding the mirrored log archive.
pub const LOG_ARCHIVE_KEY: &str = "app_logs";

/// How many mirroring failures are kept for the owner to inspect.
const FAILURE_CHANNEL_CAPACITY: usize = 32;

/// Build log metadata from a `json!({...})` object. Non-objects yield `None`.
pub fn meta(value: serde_json::Value) -> Option<Metadata> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

struct LoggerState {
    threshold: LogLevel,
    console_enabled: bool,
    buffer: VecDeque<LogEntry>,
}

/// Leveled application logger with a bounded in-memory buffer.
///
/// Every accepted entry is printed to the console sink, appended to a ring
/// buffer of [`LOG_CAPACITY`] entries (oldest evicted first) and mirrored to
/// durable storage in the background. Logging never fails: storage problems
/// are reported through [`failures`](Logger::failures) instead.
///
/// One instance is created by the composition root and shared by reference.
pub struct Logger {
    state: Mutex<LoggerState>,
    console: Arc<dyn ConsoleSink>,
    store: Arc<dyn KeyValueStore>,
    mirror: LogMirror,
    failures: Mutex<Receiver<MirrorFailure>>,
}

impl Logger {
    /// Create a logger at the default `INFO` threshold.
    pub fn new(store: Arc<dyn KeyValueStore>, console: Arc<dyn ConsoleSink>) -> Self {
        let (failure_tx, failure_rx) = mpsc::channel(FAILURE_CHANNEL_CAPACITY);
        let mirror = LogMirror::spawn(
            Arc::clone(&store),
            LOG_ARCHIVE_KEY,
            Arc::clone(&console),
            failure_tx,
        );

        Self {
            state: Mutex::new(LoggerState {
                threshold: LogLevel::default(),
                console_enabled: true,
                buffer: VecDeque::with_capacity(LOG_CAPACITY),
            }),
            console,
            store,
            mirror,
            failures: Mutex::new(failure_rx),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the minimum level. Already buffered entries are kept.
    pub fn set_level(&self, level: LogLevel) {
        self.lock().threshold = level;
    }

    pub fn level(&self) -> LogLevel {
        self.lock().threshold
    }

    /// Turn console output on or off. Entries are still buffered and mirrored.
    pub fn set_console_enabled(&self, enabled: bool) {
        self.lock().console_enabled = enabled;
    }

    /// Record an entry if `level` passes the threshold.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, metadata: Option<Metadata>) {
        let mut state = self.lock();
        if level < state.threshold {
            return;
        }

        let entry = LogEntry::now(level, message, metadata);
        if state.console_enabled {
            self.console.emit(&entry.console_line());
        }

        if state.buffer.len() >= LOG_CAPACITY {
            state.buffer.pop_front();
        }
        state.buffer.push_back(entry);

        // Queued while still holding the lock so snapshots reach the
        // mirror in buffer order.
        self.mirror.write(state.buffer.iter().cloned().collect());
    }

    pub fn debug(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.log(LogLevel::Debug, message, metadata);
    }

    pub fn info(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.log(LogLevel::Info, message, metadata);
    }

    pub fn warn(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.log(LogLevel::Warn, message, metadata);
    }

    pub fn error(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.log(LogLevel::Error, message, metadata);
    }

    /// A copy of the buffer, oldest first.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.lock().buffer.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every buffered entry and remove the durable archive.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.buffer.clear();
        self.mirror.remove();
    }

    /// The buffer as pretty-printed JSON, timestamps in ISO-8601.
    pub fn export(&self) -> String {
        let entries = self.logs();
        serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Read back the text produced by [`export`](Logger::export).
    pub fn parse_export(text: &str) -> Result<Vec<LogEntry>> {
        serde_json::from_str(text).map_err(|e| VerseError::InvalidExport {
            detail: e.to_string(),
        })
    }

    /// Load the archive left by a previous run in front of the current
    /// buffer, keeping only the newest [`LOG_CAPACITY`] entries.
    ///
    /// Returns how many archived entries were loaded.
    pub fn restore(&self) -> Result<usize> {
        let Some(raw) = self.store.get(LOG_ARCHIVE_KEY)? else {
            return Ok(0);
        };
        let archived: Vec<LogEntry> =
            serde_json::from_str(&raw).map_err(|e| VerseError::Storage {
                key: LOG_ARCHIVE_KEY.to_string(),
                detail: format!("Malformed log archive: {e}"),
            })?;
        let loaded = archived.len();

        let mut state = self.lock();
        let current = std::mem::take(&mut state.buffer);
        let mut merged: VecDeque<LogEntry> = archived.into_iter().chain(current).collect();
        while merged.len() > LOG_CAPACITY {
            merged.pop_front();
        }
        state.buffer = merged;

        Ok(loaded)
    }

    /// Wait until every queued archive write has been applied.
    pub fn flush(&self) {
        self.mirror.flush();
    }

    /// Drain the mirroring failures reported since the last call.
    pub fn failures(&self) -> Vec<MirrorFailure> {
        let mut rx = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        let mut drained = Vec::new();
        while let Ok(failure) = rx.try_recv() {
            drained.push(failure);
        }
        drained
    }
}
