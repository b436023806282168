//! Connection lifecycle for the icicle client.
//!
//! A [`Client`] owns exactly one TCP connection to the server and pushes one
//! command at a time through it. When the connection breaks mid-command the
//! client swaps in a fresh one (bounded by its [`RetryPolicy`]) before
//! handing the failure back, so the next call starts from a usable socket.
use std::{
    fmt, io,
    net::{Shutdown, TcpStream},
    thread,
    time::Duration,
};

use log::{info, warn};
use thiserror::Error;

use crate::protocol::{ProtocolTransport, WireError};

/// List of possible errors a client call can throw.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to reconnect after {attempts} attempts")]
    ReconnectExhausted {
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Wire(#[from] WireError),
}

impl ClientError {
    /// Whether the server answered the command with an error of its own.
    ///
    /// Such errors travel over a healthy connection; everything else here
    /// means the transport itself failed.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ClientError::Wire(WireError::Server(_)) | ClientError::Wire(WireError::DbNotFound(_))
        )
    }
}

/// Server address, fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Bounded reconnection policy: a fixed delay before each attempt, no
/// backoff growth.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// A connection to the database server.
///
/// The client holds one socket and supports one in-flight command. The
/// protocol has no request identifiers, so callers that want to share a
/// client across threads must serialize whole [`cmd`](Client::cmd) calls
/// themselves.
#[derive(Debug)]
pub struct Client {
    endpoint: Endpoint,
    retry: RetryPolicy,
    transport: ProtocolTransport<TcpStream>,
}

impl Client {
    /// Connects to `endpoint` with the default retry policy.
    pub fn connect(endpoint: Endpoint) -> Result<Self, ClientError> {
        Self::with_policy(endpoint, RetryPolicy::default())
    }

    /// Connects to `endpoint`, reconnecting per `retry` when a later
    /// command hits a transport fault. The initial connection is a single
    /// attempt.
    pub fn with_policy(endpoint: Endpoint, retry: RetryPolicy) -> Result<Self, ClientError> {
        let stream = open(&endpoint).map_err(|source| ClientError::Connection {
            addr: endpoint.to_string(),
            source,
        })?;

        Ok(Self {
            endpoint,
            retry,
            transport: ProtocolTransport::new(stream),
        })
    }

    /// Sends `command` and reads the matching response.
    ///
    /// A transport or framing failure poisons the connection: the client
    /// reconnects once and re-raises the original error without resending
    /// the command, leaving the retry decision to the caller. A
    /// server-reported error is raised directly and the connection is kept.
    pub fn cmd(&mut self, command: &str) -> Result<String, ClientError> {
        let outcome = self
            .transport
            .send_command(command)
            .and_then(|_| self.transport.read_response());

        match outcome {
            Err(e) if e.is_connection_fault() => {
                warn!("connection fault while running command: {e}");
                self.reconnect()?;
                Err(e.into())
            }
            other => other.map_err(ClientError::from),
        }
    }

    /// Replaces the connection, retrying per the policy.
    ///
    /// The old socket is shut down first, close errors ignored. Each
    /// attempt is preceded by the policy's delay; the first success wins.
    fn reconnect(&mut self) -> Result<(), ClientError> {
        let _ = self.transport.get_ref().shutdown(Shutdown::Both);

        let mut last = None;
        for attempt in 1..=self.retry.max_attempts {
            thread::sleep(self.retry.delay);

            match open(&self.endpoint) {
                Ok(stream) => {
                    info!("reconnected to {} on attempt {attempt}", self.endpoint);
                    self.transport = ProtocolTransport::new(stream);
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "reconnect attempt {attempt}/{} failed: {e}",
                        self.retry.max_attempts
                    );
                    last = Some(e);
                }
            }
        }

        Err(ClientError::ReconnectExhausted {
            attempts: self.retry.max_attempts,
            source: last.unwrap_or_else(|| io::Error::other("no reconnect attempts were made")),
        })
    }
}

fn open(endpoint: &Endpoint) -> io::Result<TcpStream> {
    info!("connecting to {endpoint}");
    TcpStream::connect((endpoint.host.as_str(), endpoint.port))
}
