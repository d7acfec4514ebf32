use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use agni_core::{LogLevel, LogMessage};
use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::LoggerError;
use crate::rotation::RotatingFile;

/// Capacity of the buffered channel substituted for the source's unbuffered
/// `chan LogMessage`. `spec.md` §4.2 explicitly allows this deviation as
/// long as the capacity is documented: 1024 lets a burst of log calls from
/// many concurrently running units queue briefly without dropping, while
/// still applying back-pressure (via `try_send`, see [`Logger::write_log`])
/// rather than blocking the caller forever.
pub const CHANNEL_CAPACITY: usize = 1024;

fn level_rank(level: LogLevel) -> u8 {
    match level {
        LogLevel::Debug => 0,
        LogLevel::Info => 1,
        LogLevel::Warn => 2,
        LogLevel::Error | LogLevel::Panic | LogLevel::Fatal => 3,
    }
}

/// Background log sink: one receiver task, many producers. Mirrors
/// `spec.md` §4.2's `Logger` contract: `Initialize` prepares the rotating
/// file, `Start` spawns the receiver, `WriteLog` is non-blocking, and
/// `Set_LogLevel` adjusts the filter without restarting anything.
pub struct Logger {
    path: PathBuf,
    pid: u32,
    filter: Arc<AtomicU8>,
    started: Arc<AtomicBool>,
    sender: Option<mpsc::Sender<LogMessage>>,
    receiver_task: Option<JoinHandle<()>>,
}

impl Logger {
    /// `Initialize(host, filepath, level, pid)`
    pub fn new(path: PathBuf, level: LogLevel, pid: u32) -> Self {
        Self {
            path,
            pid,
            filter: Arc::new(AtomicU8::new(level_rank(level.clamp_for_filter()))),
            started: Arc::new(AtomicBool::new(false)),
            sender: None,
            receiver_task: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Spawns the single receiver task reading from the buffered channel.
    pub fn start(&mut self) -> Result<(), LoggerError> {
        if self.is_started() {
            return Err(LoggerError::AlreadyStarted);
        }
        let (tx, mut rx) = mpsc::channel::<LogMessage>(CHANNEL_CAPACITY);
        let path = self.path.clone();
        let pid = self.pid;
        let filter = Arc::clone(&self.filter);
        let started = Arc::clone(&self.started);

        let handle = tokio::spawn(async move {
            let mut file = match tokio::task::spawn_blocking({
                let path = path.clone();
                move || RotatingFile::open(&path)
            })
            .await
            {
                Ok(Ok(f)) => f,
                Ok(Err(e)) => {
                    error!(error = %e, path = %path.display(), "failed to open log file");
                    return;
                }
                Err(e) => {
                    error!(error = %e, "log file open task panicked");
                    return;
                }
            };

            while let Some(msg) = rx.recv().await {
                if level_rank(msg.level.clamp_for_filter()) < filter.load(Ordering::SeqCst) {
                    continue;
                }
                let line = format!(
                    "{} [{}] pid={} {}",
                    Local::now().to_rfc3339(),
                    msg.level.as_str(),
                    pid,
                    msg.rendered_text()
                );
                let result = tokio::task::spawn_blocking(move || {
                    let outcome = file.write_line(&line);
                    (file, outcome)
                })
                .await;
                match result {
                    Ok((f, Ok(()))) => file = f,
                    Ok((f, Err(e))) => {
                        error!(error = %e, "failed to write log line");
                        file = f;
                    }
                    Err(e) => {
                        error!(error = %e, "log writer task panicked");
                        return;
                    }
                }
            }
        });

        self.sender = Some(tx);
        self.receiver_task = Some(handle);
        self.started.store(true, Ordering::SeqCst);
        info!("logger initialized & started");
        Ok(())
    }

    /// `WriteLog`: non-blocking. Drops the message if the sink isn't
    /// started, or if the buffered queue is momentarily full.
    pub fn write_log(&self, msg: LogMessage) {
        if !self.is_started() {
            return;
        }
        if let Some(sender) = &self.sender {
            if sender.try_send(msg).is_err() {
                error!("log channel full or closed, dropping message");
            }
        }
    }

    pub fn debug(&self, text: impl Into<String>) {
        self.write_log(LogMessage::new(LogLevel::Debug, text));
    }
    pub fn info(&self, text: impl Into<String>) {
        self.write_log(LogMessage::new(LogLevel::Info, text));
    }
    pub fn warn(&self, text: impl Into<String>) {
        self.write_log(LogMessage::new(LogLevel::Warn, text));
    }
    pub fn error(&self, text: impl Into<String>) {
        self.write_log(LogMessage::new(LogLevel::Error, text));
    }
    pub fn fatal(&self, text: impl Into<String>) {
        self.write_log(LogMessage::new(LogLevel::Fatal, text));
    }
    pub fn panic(&self, text: impl Into<String>) {
        self.write_log(LogMessage::new(LogLevel::Panic, text));
    }

    /// `Set_LogLevel`
    pub fn set_log_level(&self, level: LogLevel) {
        self.filter
            .store(level_rank(level.clamp_for_filter()), Ordering::SeqCst);
    }

    pub fn log_level_from_query(value: &str) -> Result<LogLevel, agni_core::CoreError> {
        LogLevel::from_str(value)
    }

    /// `Stop`: closes the channel (dropping the sender makes the receiver
    /// loop exit), awaits the receiver task, and clears `IS_Started`.
    pub async fn stop(&mut self) {
        if !self.is_started() {
            return;
        }
        self.sender = None;
        if let Some(handle) = self.receiver_task.take() {
            let _ = handle.await;
        }
        self.started.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_are_dropped_before_start() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agni-demo.log");
        let logger = Logger::new(path.clone(), LogLevel::Debug, 123);
        logger.info("should be dropped");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn writes_flow_through_once_started_and_respect_level_filter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agni-demo.log");
        let mut logger = Logger::new(path.clone(), LogLevel::Warn, 123);
        logger.start().unwrap();

        logger.debug("hidden by filter");
        logger.warn("visible warning");
        logger.error("visible error");

        logger.stop().await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(!contents.contains("hidden by filter"));
        assert!(contents.contains("visible warning"));
        assert!(contents.contains("visible error"));
    }

    #[tokio::test]
    async fn panic_level_lines_get_prefixed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agni-demo.log");
        let mut logger = Logger::new(path.clone(), LogLevel::Debug, 123);
        logger.start().unwrap();
        logger.panic("something went very wrong");
        logger.stop().await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("**PANIC** something went very wrong"));
    }

    #[tokio::test]
    async fn set_log_level_changes_the_active_filter_without_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agni-demo.log");
        let mut logger = Logger::new(path.clone(), LogLevel::Error, 123);
        logger.start().unwrap();

        logger.info("still hidden");
        logger.set_log_level(LogLevel::Info);
        logger.info("now visible");
        logger.stop().await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(!contents.contains("still hidden"));
        assert!(contents.contains("now visible"));
    }
}
