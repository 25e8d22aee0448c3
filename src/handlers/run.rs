use anyhow::Result;
use std::env;
use crate::cli::RemoteArgs;
use crate::config::load_config;
use crate::handlers::{build_session, render};
use crate::shell::ast::ParsedCommand;

/// Runs one command. Returns the process exit code.
pub async fn handle_run(remote: RemoteArgs, command: String, args: Vec<String>) -> Result<i32> {
    let mut config = load_config(&env::current_dir()?)?;
    let mut session = build_session(&mut config, &remote, "run")?;

    let line = ParsedCommand::new(command, args).to_line();
    let outcome = session.run(&line).await;
    render::print_outcome(&outcome);
    session.shutdown();

    Ok(if outcome.result.is_success() { 0 } else { 1 })
}
