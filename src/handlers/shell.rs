use anyhow::{Context, Result};
use colored::*;
use std::env;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use crate::cli::RemoteArgs;
use crate::config::load_config;
use crate::handlers::{build_session, render};

pub async fn handle_shell(remote: RemoteArgs) -> Result<()> {
    let mut config = load_config(&env::current_dir()?)?;
    let mut session = build_session(&mut config, &remote, "shell")?;

    if remote.local {
        eprintln!("{} Local mode, no server will be contacted.", "💻".cyan());
    } else {
        eprintln!("{} Remote: {} (falls back to local)", "🌐".cyan(), config.client.addr().bold());
    }
    eprintln!("Type 'help' for commands, 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let now = Instant::now();
        let prompt = if session.cooldown().is_active(now) {
            let wait = session.cooldown().remaining(now).as_secs_f32().ceil();
            format!("{} {}> ", format!("(local {}s)", wait).yellow(), session.context().cwd().display())
        } else {
            format!("{}> ", session.context().cwd().display())
        };
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            println!();
            break;
        };

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let outcome = session.run(trimmed).await;
        render::print_outcome(&outcome);
    }

    log::debug!("Session ended after {} remote attempt(s)", session.remote_attempts());
    session.shutdown();
    Ok(())
}
