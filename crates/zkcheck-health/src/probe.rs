//! Four letter word probe.
//!
//! Opens a fresh TCP connection per command, writes the command word,
//! and reads the reply until the server closes the socket or the
//! response cap is reached.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use zkcheck_core::Endpoint;

use crate::error::{ProbePhase, ProbeError, ProbeResult};

/// Upper bound on a single response. Longer replies are truncated.
pub const MAX_RESPONSE_BYTES: usize = 2048;

/// Diagnostic command words understood by the admin port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Tab-separated metrics dump (3.4+).
    Mntr,
    /// Legacy free-text status report.
    Stat,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Mntr => "mntr",
            Command::Stat => "stat",
        }
    }
}

/// Send `command` to `endpoint` and return the raw reply.
///
/// `timeout` bounds the connect and, separately, the write+read exchange.
/// The socket is dropped on every return path.
pub async fn probe(endpoint: &Endpoint, command: Command, timeout: Duration) -> ProbeResult<Vec<u8>> {
    let id = endpoint.id();

    let connect = TcpStream::connect((endpoint.host(), endpoint.port()));
    let mut stream = match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => {
            return Err(ProbeError::Connect {
                endpoint: id,
                source,
            });
        }
        Err(_) => {
            return Err(ProbeError::Timeout {
                endpoint: id,
                phase: ProbePhase::Connect,
            });
        }
    };

    let result = tokio::time::timeout(timeout, exchange(&mut stream, command)).await;
    let _ = stream.shutdown().await;
    drop(stream);

    match result {
        Ok(Ok(data)) => {
            trace!(endpoint = %id, command = command.as_str(), bytes = data.len(), "probe reply");
            if data.len() == MAX_RESPONSE_BYTES {
                debug!(endpoint = %id, command = command.as_str(), "reply hit the size cap, truncated");
            }
            Ok(data)
        }
        Ok(Err(source)) => Err(ProbeError::Io {
            endpoint: id,
            source,
        }),
        Err(_) => Err(ProbeError::Timeout {
            endpoint: id,
            phase: ProbePhase::Read,
        }),
    }
}

async fn exchange(stream: &mut TcpStream, command: Command) -> std::io::Result<Vec<u8>> {
    stream.write_all(command.as_str().as_bytes()).await?;

    let mut buf = Vec::with_capacity(MAX_RESPONSE_BYTES);
    (&mut *stream)
        .take(MAX_RESPONSE_BYTES as u64)
        .read_to_end(&mut buf)
        .await?;
    Ok(buf)
}
