use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, Sender, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

use crate::core::errors::{Result, VerseError};
use crate::core::models::log_entry::LogEntry;
use crate::core::traits::console::ConsoleSink;
use crate::core::traits::kv_store::KeyValueStore;

/// A durable write of the log archive that did not succeed.
#[derive(Debug, Clone)]
pub struct MirrorFailure {
    pub at: DateTime<Utc>,
    pub detail: String,
}

enum MirrorCommand {
    Write(Vec<LogEntry>),
    Remove,
    Flush(oneshot::Sender<()>),
}

/// Background writer that keeps a copy of the log buffer in a
/// [`KeyValueStore`].
///
/// Commands are applied in the order they were queued. Consecutive writes
/// collapse into the newest snapshot. Failures are reported to the console
/// and pushed onto a bounded channel; when that channel is full the failure
/// is dropped.
pub struct LogMirror {
    tx: Option<UnboundedSender<MirrorCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl LogMirror {
    /// Start the worker thread. If the thread cannot be spawned the mirror
    /// is disabled and the logger keeps working in memory only.
    pub fn spawn(
        store: Arc<dyn KeyValueStore>,
        key: &str,
        console: Arc<dyn ConsoleSink>,
        failures: Sender<MirrorFailure>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let key = key.to_string();
        let warn_console = Arc::clone(&console);

        let spawned = thread::Builder::new()
            .name("log-mirror".into())
            .spawn(move || run(rx, store.as_ref(), &key, console.as_ref(), &failures));

        match spawned {
            Ok(worker) => Self {
                tx: Some(tx),
                worker: Some(worker),
            },
            Err(e) => {
                warn_console.warn(&format!("Log mirroring disabled: {e}"));
                Self {
                    tx: None,
                    worker: None,
                }
            }
        }
    }

    /// Queue a snapshot of the whole buffer.
    pub fn write(&self, snapshot: Vec<LogEntry>) {
        self.send(MirrorCommand::Write(snapshot));
    }

    /// Queue removal of the archive.
    pub fn remove(&self) {
        self.send(MirrorCommand::Remove);
    }

    /// Block until every command queued so far has been applied.
    ///
    /// Must not be called from inside an async context.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.send(MirrorCommand::Flush(ack_tx)) {
            let _ = ack_rx.blocking_recv();
        }
    }

    fn send(&self, command: MirrorCommand) -> bool {
        self.tx
            .as_ref()
            .is_some_and(|tx| tx.send(command).is_ok())
    }
}

impl Drop for LogMirror {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run(
    mut rx: UnboundedReceiver<MirrorCommand>,
    store: &dyn KeyValueStore,
    key: &str,
    console: &dyn ConsoleSink,
    failures: &Sender<MirrorFailure>,
) {
    let mut pending: Option<MirrorCommand> = None;

    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match rx.blocking_recv() {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            MirrorCommand::Write(mut snapshot) => {
                while let Ok(next) = rx.try_recv() {
                    match next {
                        MirrorCommand::Write(newer) => snapshot = newer,
                        other => {
                            pending = Some(other);
                            break;
                        }
                    }
                }
                if let Err(e) = write_archive(store, key, &snapshot) {
                    report(console, failures, format!("Failed to save logs to storage: {e}"));
                }
            }
            MirrorCommand::Remove => {
                if let Err(e) = store.remove(key) {
                    report(console, failures, format!("Failed to remove stored logs: {e}"));
                }
            }
            MirrorCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn write_archive(store: &dyn KeyValueStore, key: &str, snapshot: &[LogEntry]) -> Result<()> {
    let json = serde_json::to_string(snapshot).map_err(|e| VerseError::Storage {
        key: key.to_string(),
        detail: format!("Failed to serialize log archive: {e}"),
    })?;
    store.set(key, &json)
}

fn report(console: &dyn ConsoleSink, failures: &Sender<MirrorFailure>, detail: String) {
    console.warn(&detail);
    let failure = MirrorFailure {
        at: Utc::now(),
        detail,
    };
    // Nobody draining the channel is fine; extra failures are dropped.
    let _ = failures.try_send(failure);
}
