mod cli;
mod config;
mod handlers;
mod logger;
mod net;
mod session;
mod shell;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use handlers::{run, serve, shell as repl};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, port, dir } => serve::handle_serve(bind, port, dir).await,
        Commands::Shell { remote } => repl::handle_shell(remote).await,
        Commands::Run { remote, command, args } => {
            let code = run::handle_run(remote, command, args).await?;
            std::process::exit(code);
        }
    }
}
