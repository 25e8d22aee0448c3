use anyhow::Result;
use colored::*;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use crate::config::load_config;
use crate::logger::AuditLog;
use crate::net::server::ShellServer;
use crate::shell::commands::CommandRegistry;

pub async fn handle_serve(bind: Option<String>, port: Option<u16>, dir: Option<PathBuf>) -> Result<()> {
    let current_dir = env::current_dir()?;
    let mut config = load_config(&current_dir)?;

    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let start_dir = dir.unwrap_or(current_dir);

    let registry = Arc::new(CommandRegistry::with_builtins());
    let audit = AuditLog::spawn(&config.audit.dir, "server", config.audit.strategy)?;
    if let Some(audit) = &audit {
        eprintln!("{} Audit log: {}", "📝".blue(), audit.path().display());
    }
    let server = ShellServer::bind(&config.server.addr(), registry, start_dir.clone())
        .await?
        .with_max_frame_bytes(config.server.max_frame_bytes)
        .with_audit(audit.clone());

    eprintln!(
        "{} Serving {} on {}",
        "🚀".green(),
        start_dir.display().to_string().bold(),
        server.local_addr()?.to_string().cyan()
    );

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    if let Some(audit) = audit {
        audit.shutdown();
    }
    eprintln!("{} Server stopped.", "👋".yellow());
    Ok(())
}
