use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tc", version, about = "tcmd: file commander with a remote command server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve file commands over TCP
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Starting directory for every connection (defaults to the current one)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Interactive prompt; tries the server first, falls back to local execution
    Shell {
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Run a single command and exit (non-zero when it fails)
    Run {
        #[command(flatten)]
        remote: RemoteArgs,

        command: String,

        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        args: Vec<String>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Never contact a server
    #[arg(short, long)]
    pub local: bool,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,
}
