pub mod render;
pub mod run;
pub mod serve;
pub mod shell;

use anyhow::Result;
use std::sync::Arc;
use crate::cli::RemoteArgs;
use crate::config::TcConfig;
use crate::logger::AuditLog;
use crate::net::client::ShellClient;
use crate::session::Session;
use crate::shell::commands::CommandRegistry;
use crate::shell::context::ShellContext;

/// Builds the client-side session shared by `tc shell` and `tc run`.
pub(crate) fn build_session(config: &mut TcConfig, remote: &RemoteArgs, origin: &str) -> Result<Session> {
    if let Some(host) = &remote.host {
        config.client.host = host.clone();
    }
    if let Some(port) = remote.port {
        config.client.port = port;
    }

    let registry = Arc::new(CommandRegistry::with_builtins());
    let context = ShellContext::new(registry)?;

    let client = (!remote.local).then(|| {
        ShellClient::new(config.client.addr(), config.client.timeout())
            .with_max_frame_bytes(config.server.max_frame_bytes)
    });

    let audit = AuditLog::spawn(&config.audit.dir, origin, config.audit.strategy)?;
    Ok(Session::new(context, client, config.client.cooldown()).with_audit(audit))
}
