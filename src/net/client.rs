use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use crate::net::protocol::{DEFAULT_MAX_FRAME_BYTES, Request, Response, decode, encode, read_frame, write_frame};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unreachable: {0}")]
    Unreachable(#[from] io::Error),

    #[error("connection closed before a response arrived")]
    Closed,

    #[error("malformed payload: {0}")]
    Protocol(#[from] serde_json::Error),
}

/// One fresh connection per command; nothing is kept between calls.
#[derive(Debug, Clone)]
pub struct ShellClient {
    addr: String,
    timeout: Duration,
    max_frame_bytes: usize,
}

impl ShellClient {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Sends one command and waits for its response.
    ///
    /// Every failure (refused, timed out, closed early, garbage reply) comes
    /// back as `None`, which callers treat as "run it locally instead".
    pub async fn send_command(
        &self,
        command: &str,
        args: &[String],
        current_directory: Option<&str>,
    ) -> Option<Response> {
        match self.try_send(command, args, current_directory).await {
            Ok(response) => Some(response),
            Err(e) => {
                log::debug!("Remote {} did not answer '{}': {}", self.addr, command, e);
                None
            }
        }
    }

    pub async fn try_send(
        &self,
        command: &str,
        args: &[String],
        current_directory: Option<&str>,
    ) -> Result<Response, ClientError> {
        let request = Request::new(command, args.to_vec(), current_directory.map(str::to_string));
        let payload = encode(&request)?;

        let mut stream = timeout(self.timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;

        timeout(self.timeout, write_frame(&mut stream, &payload))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;

        let frame = timeout(self.timeout, read_frame(&mut stream, self.max_frame_bytes))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??
            .ok_or(ClientError::Closed)?;

        Ok(decode(&frame)?)
    }
}
