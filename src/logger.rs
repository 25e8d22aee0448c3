use anyhow::{Context, Result};
use blake3::Hasher;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread;
use std::time::Duration;
use crate::config::LogStrategy;

/// One executed command, as it lands in the audit file.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: DateTime<Local>,
    pub command: String,
    pub args: Vec<String>,
    pub success: bool,
    pub message: String,
}

impl AuditEntry {
    pub fn new(command: &str, args: &[String], success: bool, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            command: command.to_string(),
            args: args.to_vec(),
            success,
            message: message.to_string(),
        }
    }

    /// Single line, tab separated. Newlines inside the message are escaped.
    pub fn to_line(&self) -> String {
        let status = if self.success { "OK" } else { "FAIL" };
        let mut line = self.command.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.chars().any(char::is_whitespace) {
                line.push_str(&format!("\"{}\"", arg));
            } else {
                line.push_str(arg);
            }
        }
        format!(
            "{}\t{}\t{}\t{}",
            self.timestamp.to_rfc3339(),
            status,
            line,
            self.message.replace('\r', "").replace('\n', "\\n")
        )
    }
}

/// Upper bound on how long [`AuditLog::shutdown`] waits for the writer.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
enum AuditMessage {
    Entry(AuditEntry),
    /// Acknowledged once every entry queued before it is on disk.
    Flush(SyncSender<()>),
}

/// Fire-and-forget audit trail. Entries go through a channel to a writer
/// thread, so `record` never blocks the caller on disk I/O. Call
/// [`AuditLog::shutdown`] before the process exits or queued entries are lost.
#[derive(Debug, Clone)]
pub struct AuditLog {
    tx: Sender<AuditMessage>,
    strategy: LogStrategy,
    path: PathBuf,
}

impl AuditLog {
    /// Returns `Ok(None)` for [`LogStrategy::None`].
    pub fn spawn(dir: &Path, origin: &str, strategy: LogStrategy) -> Result<Option<Self>> {
        if strategy == LogStrategy::None {
            return Ok(None);
        }

        let path = log_file_path(dir, origin, Local::now());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }

        let (tx, rx) = mpsc::channel();
        let writer_path = path.clone();
        thread::Builder::new()
            .name("audit-log".to_string())
            .spawn(move || write_entries(&writer_path, rx))
            .context("Failed to start audit writer")?;

        log::debug!("Audit log at {}", path.display());
        Ok(Some(Self { tx, strategy, path }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, entry: AuditEntry) {
        if self.strategy == LogStrategy::ErrorOnly && entry.success {
            return;
        }
        if self.tx.send(AuditMessage::Entry(entry)).is_err() {
            log::warn!("Audit writer stopped; entry dropped");
        }
    }

    /// Blocks until everything recorded so far (through any clone) is written.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        if self.tx.send(AuditMessage::Flush(ack_tx)).is_err() {
            log::warn!("Audit writer stopped; nothing to flush");
            return;
        }
        if ack_rx.recv_timeout(FLUSH_TIMEOUT).is_err() {
            log::warn!("Audit writer did not finish within {:?}", FLUSH_TIMEOUT);
        }
    }

    /// Flushes and releases this handle. Clones held elsewhere (e.g. by
    /// server connections still running) keep the writer alive.
    pub fn shutdown(self) {
        self.flush();
    }
}

fn write_entries(path: &Path, rx: Receiver<AuditMessage>) {
    for message in rx {
        match message {
            AuditMessage::Entry(entry) => {
                let written = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .and_then(|mut file| writeln!(file, "{}", entry.to_line()));
                if let Err(e) = written {
                    log::warn!("Failed to write audit log {}: {}", path.display(), e);
                }
            }
            AuditMessage::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// `<dir>/<YYYY-MM-DD>/<HHMMSS>_<origin>_<hash6>.log`
fn log_file_path(dir: &Path, origin: &str, now: DateTime<Local>) -> PathBuf {
    let date_str = now.format("%Y-%m-%d").to_string();
    let time_str = now.format("%H%M%S").to_string();

    // Short Hash
    let mut hasher = Hasher::new();
    hasher.update(origin.as_bytes());
    hasher.update(now.to_rfc3339().as_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    let hash_full = hasher.finalize().to_hex().to_string();
    let short_hash = &hash_full[0..6];

    let filename = format!("{}_{}_{}.log", time_str, origin.replace(['/', '\\'], "_"), short_hash);
    dir.join(date_str).join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flushed_lines(log: &AuditLog) -> Vec<String> {
        log.flush();
        fs::read_to_string(log.path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_none_strategy_spawns_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(AuditLog::spawn(tmp.path(), "shell", LogStrategy::None).unwrap().is_none());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_always_records_every_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let log = AuditLog::spawn(tmp.path(), "shell", LogStrategy::Always).unwrap().unwrap();

        log.record(AuditEntry::new("cd", &["my docs".to_string()], true, "Current directory: /x"));
        log.record(AuditEntry::new("help", &[], true, "Available commands:\n - cd"));

        let lines = flushed_lines(&log);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\tOK\tcd \"my docs\"\t"));
        assert!(lines[1].ends_with("Available commands:\\n - cd"));
    }

    #[test]
    fn test_error_only_skips_success() {
        let tmp = tempfile::tempdir().unwrap();
        let log = AuditLog::spawn(tmp.path(), "server", LogStrategy::ErrorOnly).unwrap().unwrap();

        log.record(AuditEntry::new("pwd", &[], true, "/"));
        log.record(AuditEntry::new("del", &["x".to_string()], false, "Path 'x' not found."));

        let lines = flushed_lines(&log);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\tFAIL\tdel x\t"));
    }

    #[test]
    fn test_shutdown_writes_queued_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let log = AuditLog::spawn(tmp.path(), "run", LogStrategy::Always).unwrap().unwrap();
        let path = log.path().to_path_buf();
        let clone = log.clone();

        for i in 0..50 {
            clone.record(AuditEntry::new("pwd", &[], true, &format!("/tmp/{}", i)));
        }
        log.record(AuditEntry::new("ls", &[], true, "Listing for /tmp"));
        log.shutdown();

        // No waiting: shutdown returns only after the writer caught up.
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 51);
        assert!(content.lines().last().unwrap().ends_with("\tOK\tls\tListing for /tmp"));
    }

    #[test]
    fn test_log_file_layout() {
        let now = Local::now();
        let path = log_file_path(Path::new("/logs"), "a/b", now);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert_eq!(path.parent().unwrap(), Path::new("/logs").join(now.format("%Y-%m-%d").to_string()));
        assert!(name.starts_with(&format!("{}_a_b_", now.format("%H%M%S"))));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "HHMMSS_a_b_".len() + 6 + ".log".len());
    }
}
