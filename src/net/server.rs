use anyhow::{Context, Result};
use colored::*;
use log::{debug, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use crate::logger::{AuditEntry, AuditLog};
use crate::net::protocol::{DEFAULT_MAX_FRAME_BYTES, Request, Response, decode, encode, read_frame, write_frame};
use crate::shell::ast::ParsedCommand;
use crate::shell::commands::CommandRegistry;
use crate::shell::context::ShellContext;

/// What every connection handler needs. Read-only once the server runs.
struct ConnectionSettings {
    registry: Arc<CommandRegistry>,
    start_dir: PathBuf,
    max_frame_bytes: usize,
    audit: Option<AuditLog>,
}

/// TCP front end for the command engine. Each connection gets its own
/// [`ShellContext`]; connections share nothing but the command registry.
pub struct ShellServer {
    listener: TcpListener,
    settings: ConnectionSettings,
}

impl ShellServer {
    pub async fn bind(addr: &str, registry: Arc<CommandRegistry>, start_dir: PathBuf) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        Ok(Self {
            listener,
            settings: ConnectionSettings {
                registry,
                start_dir,
                max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
                audit: None,
            },
        })
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.settings.max_frame_bytes = max_frame_bytes;
        self
    }

    pub fn with_audit(mut self, audit: Option<AuditLog>) -> Self {
        self.settings.audit = audit;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves. Connections already
    /// being served keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let settings = Arc::new(self.settings);
        let listener = self.listener;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            info!("{} Connection from {}", "🔌".cyan(), peer);
                            let settings = settings.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, settings).await {
                                    warn!("{} Connection {} ended with error: {:#}", "⚠️".yellow(), peer, e);
                                }
                                info!("Connection {} closed", peer);
                            });
                        }
                        Err(e) => {
                            warn!("{} Accept error: {}", "⚠️".yellow(), e);
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("{} Shutdown signal received", "🛑".red());
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(mut stream: TcpStream, settings: Arc<ConnectionSettings>) -> Result<()> {
    let mut ctx = ShellContext::with_dir(&settings.start_dir, settings.registry.clone())?;

    loop {
        let frame = match read_frame(&mut stream, settings.max_frame_bytes).await {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                // The rest of the oversized frame is still in the stream, so
                // answer once and give up on this connection.
                let response = Response::failure(e.to_string(), Some(cwd_string(&ctx)));
                write_response(&mut stream, &response).await.ok();
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        // Commands do blocking filesystem work; keep it off the async workers.
        let audit = settings.audit.clone();
        let (returned, response) = tokio::task::spawn_blocking(move || {
            let response = handle_request(&mut ctx, &frame, audit.as_ref());
            (ctx, response)
        })
        .await
        .context("Request handler panicked")?;
        ctx = returned;

        write_response(&mut stream, &response).await?;
    }
}

/// Decodes one request, runs it against `ctx` and builds the reply. Always
/// produces a response; a bad payload becomes a failure response.
pub fn handle_request(ctx: &mut ShellContext, payload: &[u8], audit: Option<&AuditLog>) -> Response {
    let request: Request = match decode(payload) {
        Ok(request) => request,
        Err(e) => {
            debug!("Malformed request: {}", e);
            return Response::failure(format!("Malformed request: {}", e), Some(cwd_string(ctx)));
        }
    };

    if let Some(dir) = request.current_directory.as_deref() {
        if let Err(e) = ctx.change_directory(dir) {
            debug!("Ignoring requested directory: {}", e);
        }
    }

    let line = ParsedCommand::new(request.command.clone(), request.args.clone()).to_line();
    debug!("Executing: {}", line);
    let result = ctx.execute(&line);

    if let Some(audit) = audit {
        audit.record(AuditEntry::new(&request.command, &request.args, result.is_success(), result.message()));
    }

    Response::from_result(&result, Some(cwd_string(ctx)))
}

async fn write_response(stream: &mut TcpStream, response: &Response) -> Result<()> {
    let payload = encode(response).context("Failed to encode response")?;
    write_frame(stream, &payload).await.context("Failed to write response")?;
    Ok(())
}

fn cwd_string(ctx: &ShellContext) -> String {
    ctx.cwd().to_string_lossy().into_owned()
}
