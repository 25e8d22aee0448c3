use log::{debug, warn};
use std::path::Path;
use std::time::{Duration, Instant};
use crate::logger::{AuditEntry, AuditLog};
use crate::net::client::ShellClient;
use crate::net::cooldown::Cooldown;
use crate::net::protocol::Response;
use crate::shell::ast::ParsedCommand;
use crate::shell::context::ShellContext;
use crate::shell::parser::parse_command_line;
use crate::shell::result::{CommandResult, FileEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    Local,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Remote => "remote",
            Origin::Local => "local",
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub origin: Origin,
    pub result: CommandResult,
}

/// Client-side driver: tries the remote server first and falls back to the
/// local context when it is unreachable. After a failed attempt the remote
/// is left alone until the cooldown runs out.
pub struct Session {
    context: ShellContext,
    client: Option<ShellClient>,
    cooldown: Cooldown,
    audit: Option<AuditLog>,
    remote_attempts: u64,
}

impl Session {
    pub fn new(context: ShellContext, client: Option<ShellClient>, cooldown: Duration) -> Self {
        Self {
            context,
            client,
            cooldown: Cooldown::new(cooldown),
            audit: None,
            remote_attempts: 0,
        }
    }

    pub fn with_audit(mut self, audit: Option<AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub fn context(&self) -> &ShellContext {
        &self.context
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Connection attempts made so far, whatever their result.
    pub fn remote_attempts(&self) -> u64 {
        self.remote_attempts
    }

    /// Ends the session, writing out any audit entries still queued.
    pub fn shutdown(self) {
        if let Some(audit) = self.audit {
            audit.shutdown();
        }
    }

    pub async fn run(&mut self, input: &str) -> Outcome {
        // Bad or empty input never leaves the machine; the local context
        // produces the proper failure for it.
        let parsed = parse_command_line(input).unwrap_or_default();

        let remote = if parsed.is_empty() {
            None
        } else {
            self.try_remote(&parsed).await
        };
        let outcome = match remote {
            Some(outcome) => outcome,
            None => Outcome {
                origin: Origin::Local,
                result: self.context.execute(input),
            },
        };

        if let Some(audit) = &self.audit {
            let command = if parsed.is_empty() { input.trim() } else { parsed.name.as_str() };
            let message = format!("[{}] {}", outcome.origin.label(), outcome.result.message());
            audit.record(AuditEntry::new(command, &parsed.args, outcome.result.is_success(), &message));
        }

        outcome
    }

    async fn try_remote(&mut self, parsed: &ParsedCommand) -> Option<Outcome> {
        let client = self.client.as_ref()?;

        let now = Instant::now();
        if self.cooldown.is_active(now) {
            debug!("Remote skipped, retrying in {:?}", self.cooldown.remaining(now));
            return None;
        }

        self.remote_attempts += 1;
        let cwd = self.context.cwd().to_string_lossy().into_owned();
        match client.send_command(&parsed.name, &parsed.args, Some(&cwd)).await {
            Some(response) => {
                self.cooldown.clear();
                if let Some(dir) = response.current_directory.as_deref() {
                    if let Err(e) = self.context.change_directory(dir) {
                        debug!("Remote directory not available locally: {}", e);
                    }
                }
                Some(Outcome {
                    origin: Origin::Remote,
                    result: response_to_result(response),
                })
            }
            None => {
                self.cooldown.trip(Instant::now());
                warn!("Remote {} unreachable, running locally", client.addr());
                None
            }
        }
    }
}

fn response_to_result(response: Response) -> CommandResult {
    if !response.success {
        return CommandResult::failure(response.message);
    }
    // Only paths travel over the wire. Stat-ing them here would describe
    // whatever happens to share the name locally, so keep the names alone.
    let items = response.items.map(|paths| {
        paths
            .iter()
            .map(|p| FileEntry::name_only(Path::new(p)))
            .collect()
    });
    CommandResult::success(response.message, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogStrategy;
    use crate::net::server::ShellServer;
    use crate::shell::commands::CommandRegistry;
    use std::fs;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    fn local_context(dir: &Path) -> ShellContext {
        ShellContext::with_dir(dir, Arc::new(CommandRegistry::with_builtins())).unwrap()
    }

    async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        addr
    }

    async fn start_server(dir: &Path) -> String {
        let registry = Arc::new(CommandRegistry::with_builtins());
        let server = ShellServer::bind("127.0.0.1:0", registry, dir.to_path_buf())
            .await
            .unwrap();
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(server.run_until(std::future::pending()));
        addr
    }

    #[tokio::test]
    async fn test_local_only() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = Session::new(local_context(tmp.path()), None, Duration::from_secs(5));

        let outcome = session.run("pwd").await;
        assert_eq!(outcome.origin, Origin::Local);
        assert!(outcome.result.is_success());
        assert_eq!(session.remote_attempts(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_falls_back_and_cools_down() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let client = ShellClient::new(closed_port().await, Duration::from_millis(500));
        let mut session = Session::new(local_context(tmp.path()), Some(client), Duration::from_secs(5));

        let outcome = session.run("cd sub").await;
        assert_eq!(outcome.origin, Origin::Local);
        assert!(outcome.result.is_success());
        assert_eq!(session.context().cwd(), tmp.path().join("sub"));
        assert_eq!(session.remote_attempts(), 1);
        assert!(session.cooldown().is_active(Instant::now()));

        // Inside the window the remote is not even tried.
        let started = Instant::now();
        let outcome = session.run("pwd").await;
        assert_eq!(outcome.origin, Origin::Local);
        assert_eq!(session.remote_attempts(), 1);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_expired_cooldown_retries() {
        let tmp = tempfile::tempdir().unwrap();
        let client = ShellClient::new(closed_port().await, Duration::from_millis(300));
        let mut session = Session::new(local_context(tmp.path()), Some(client), Duration::from_millis(50));

        session.run("pwd").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.run("pwd").await;
        assert_eq!(session.remote_attempts(), 2);
    }

    #[tokio::test]
    async fn test_remote_success_syncs_directory() {
        let server_dir = tempfile::tempdir().unwrap();
        let local_dir = tempfile::tempdir().unwrap();
        fs::create_dir(local_dir.path().join("shared")).unwrap();
        fs::write(local_dir.path().join("shared").join("a.txt"), "abc").unwrap();

        let addr = start_server(server_dir.path()).await;
        let client = ShellClient::new(addr, Duration::from_secs(2));
        let mut session = Session::new(local_context(local_dir.path()), Some(client), Duration::from_secs(5));

        // The request carries the local cwd, so relative paths line up.
        let outcome = session.run("cd shared").await;
        assert_eq!(outcome.origin, Origin::Remote);
        assert!(outcome.result.is_success(), "{}", outcome.result.message());
        assert_eq!(session.context().cwd(), local_dir.path().join("shared"));
        assert!(!session.cooldown().is_active(Instant::now()));

        let outcome = session.run("ls").await;
        assert_eq!(outcome.origin, Origin::Remote);
        assert!(outcome.result.has_listing());
        let items = outcome.result.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "a.txt");
        assert_eq!(items[0].full_path, local_dir.path().join("shared").join("a.txt"));
        assert_eq!(items[0].size, None);
    }

    #[tokio::test]
    async fn test_remote_items_do_not_take_local_metadata() {
        let server_dir = tempfile::tempdir().unwrap();
        fs::create_dir(server_dir.path().join("only_remote")).unwrap();
        let addr = start_server(server_dir.path()).await;
        let client = ShellClient::new(addr, Duration::from_secs(2));
        let local_dir = tempfile::tempdir().unwrap();
        let remote_dir = server_dir.path().to_string_lossy().into_owned();
        let mut session = Session::new(local_context(local_dir.path()), Some(client), Duration::from_secs(5));

        let outcome = session.run(&format!("ls \"{}\"", remote_dir)).await;
        assert_eq!(outcome.origin, Origin::Remote);
        let items = outcome.result.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "only_remote");
        assert!(!items[0].is_directory);
        assert_eq!(items[0].modified_at, None);
    }

    #[tokio::test]
    async fn test_remote_failure_is_not_fallback() {
        let server_dir = tempfile::tempdir().unwrap();
        let addr = start_server(server_dir.path()).await;
        let client = ShellClient::new(addr, Duration::from_secs(2));
        let mut session = Session::new(local_context(server_dir.path()), Some(client), Duration::from_secs(5));

        let outcome = session.run("del missing.txt").await;
        assert_eq!(outcome.origin, Origin::Remote);
        assert!(!outcome.result.is_success());
        assert!(!session.cooldown().is_active(Instant::now()));
    }

    #[tokio::test]
    async fn test_malformed_input_stays_local() {
        let tmp = tempfile::tempdir().unwrap();
        let client = ShellClient::new(closed_port().await, Duration::from_millis(300));
        let mut session = Session::new(local_context(tmp.path()), Some(client), Duration::from_secs(5));

        let outcome = session.run("cd \"unterminated").await;
        assert_eq!(outcome.origin, Origin::Local);
        assert_eq!(outcome.result.message(), "Unmatched quotes in command.");

        let outcome = session.run("   ").await;
        assert_eq!(outcome.origin, Origin::Local);
        assert!(!outcome.result.is_success());
        assert_eq!(session.remote_attempts(), 0);
    }

    #[tokio::test]
    async fn test_outcomes_are_audited() {
        let tmp = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let audit = AuditLog::spawn(logs.path(), "shell", LogStrategy::Always).unwrap();
        let path = audit.as_ref().unwrap().path().to_path_buf();
        let mut session = Session::new(local_context(tmp.path()), None, Duration::from_secs(5)).with_audit(audit);

        session.run("pwd").await;
        session.run("cd nowhere").await;
        session.shutdown();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\tOK\tpwd\t[local] "));
        assert!(lines[1].contains("\tFAIL\tcd nowhere\t[local] "));
    }
}
