//! Job logs
//!
//! Each job writes a plain-text log to `<logs dir>/<resource id>.log`, one
//! [`LogEntry`] per line, and forwards the same entries to the control plane.
//! Workspaces and targets share the target logs directory; builds have their
//! own.
//!
//! Writing never blocks the job: entries are queued on a channel and a
//! background task appends them to the file and sends them on in batches.

use chrono::Utc;
use keel_core::domain::log::{LogEntry, LogLevel, LogSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::repository::LogRepository;

/// Most entries sent to the control plane in one request
const MAX_BATCH: usize = 100;

/// Hands out loggers for the configured log directories
///
/// A factory without a directory for a resource kind writes no file for it,
/// and one without a repository forwards nothing. With neither, loggers only
/// forward to tracing.
#[derive(Clone, Default)]
pub struct LoggerFactory {
    target_logs_dir: Option<PathBuf>,
    build_logs_dir: Option<PathBuf>,
    remote: Option<Arc<dyn LogRepository>>,
}

impl LoggerFactory {
    pub fn new(target_logs_dir: Option<PathBuf>, build_logs_dir: Option<PathBuf>) -> Self {
        Self {
            target_logs_dir,
            build_logs_dir,
            remote: None,
        }
    }

    /// Also forwards every entry through `repository`
    pub fn with_remote(mut self, repository: Arc<dyn LogRepository>) -> Self {
        self.remote = Some(repository);
        self
    }

    pub fn workspace_logger(&self, workspace_id: &str) -> JobLogger {
        self.open(LogSource::Workspace, self.target_logs_dir.as_deref(), workspace_id)
    }

    pub fn target_logger(&self, target_id: &str) -> JobLogger {
        self.open(LogSource::Target, self.target_logs_dir.as_deref(), target_id)
    }

    pub fn build_logger(&self, build_id: &str) -> JobLogger {
        self.open(LogSource::Build, self.build_logs_dir.as_deref(), build_id)
    }

    fn open(&self, source: LogSource, dir: Option<&Path>, resource_id: &str) -> JobLogger {
        let path = dir.and_then(|dir| {
            let path = log_file_path(dir, resource_id);
            if path.is_none() {
                warn!("Not writing a log file for invalid resource id {:?}", resource_id);
            }
            path
        });

        if path.is_none() && self.remote.is_none() {
            return JobLogger {
                resource_id: resource_id.to_string(),
                sender: None,
                forwarder: None,
            };
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let sink = LogSink {
            source,
            resource_id: resource_id.to_string(),
            path,
            remote: self.remote.clone(),
        };

        JobLogger {
            resource_id: resource_id.to_string(),
            sender: Some(sender),
            forwarder: Some(tokio::spawn(sink.run(receiver))),
        }
    }
}

/// `<dir>/<resource id>.log`, or `None` if the id is not a plain file name
fn log_file_path(dir: &Path, resource_id: &str) -> Option<PathBuf> {
    let plain = !resource_id.is_empty()
        && resource_id != "."
        && resource_id != ".."
        && !resource_id.contains(['/', '\\', '\0']);

    plain.then(|| dir.join(format!("{}.log", resource_id)))
}

/// Log writer for a single resource
pub struct JobLogger {
    resource_id: String,
    sender: Option<mpsc::UnboundedSender<LogEntry>>,
    forwarder: Option<JoinHandle<()>>,
}

impl JobLogger {
    pub fn info(&self, message: impl Into<String>) {
        self.write(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.write(LogLevel::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.write(LogLevel::Error, message.into());
    }

    fn write(&self, level: LogLevel, message: String) {
        debug!("[{}] {}", self.resource_id, message);

        let Some(sender) = &self.sender else {
            return;
        };

        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message,
        };

        if sender.send(entry).is_err() {
            warn!("Log writer for {} has stopped, dropping entry", self.resource_id);
        }
    }

    /// Waits until every entry written so far is stored and forwarded
    ///
    /// Dropping a logger without closing it still delivers its entries, just
    /// without waiting for them.
    pub async fn close(self) {
        let Self {
            resource_id,
            sender,
            forwarder,
        } = self;
        drop(sender);

        if let Some(forwarder) = forwarder {
            if let Err(e) = forwarder.await {
                warn!("Log writer for {} failed: {}", resource_id, e);
            }
        }
    }
}

/// Background half of a [`JobLogger`]
struct LogSink {
    source: LogSource,
    resource_id: String,
    path: Option<PathBuf>,
    remote: Option<Arc<dyn LogRepository>>,
}

impl LogSink {
    async fn run(self, mut receiver: mpsc::UnboundedReceiver<LogEntry>) {
        let mut file = match &self.path {
            Some(path) => self.open_file(path).await,
            None => None,
        };

        let mut batch = Vec::new();
        while let Some(entry) = receiver.recv().await {
            batch.push(entry);
            while batch.len() < MAX_BATCH {
                match receiver.try_recv() {
                    Ok(entry) => batch.push(entry),
                    Err(_) => break,
                }
            }

            if let Some(file) = file.as_mut() {
                self.append(file, &batch).await;
            }
            self.forward(&batch).await;
            batch.clear();
        }
    }

    async fn open_file(&self, path: &Path) -> Option<File> {
        if let Some(dir) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                warn!("Failed to create log directory {}: {}", dir.display(), e);
                return None;
            }
        }

        match OpenOptions::new().create(true).append(true).open(path).await {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Failed to open log file for {}: {}", self.resource_id, e);
                None
            }
        }
    }

    async fn append(&self, file: &mut File, batch: &[LogEntry]) {
        let mut text = String::new();
        for entry in batch {
            text.push_str(&entry.to_string());
            text.push('\n');
        }

        let written = match file.write_all(text.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!("Failed to write log for {}: {}", self.resource_id, e);
        }
    }

    async fn forward(&self, batch: &[LogEntry]) {
        let Some(remote) = &self.remote else {
            return;
        };

        if let Err(e) = remote.write_logs(self.source, &self.resource_id, batch).await {
            warn!(
                "Failed to forward {} log entries for {} {}: {}",
                batch.len(),
                self.source,
                self.resource_id,
                e
            );
        }
    }
}
