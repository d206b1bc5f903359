//! Session management
//!
//! Owns the physical channel for the duration of one command/response
//! transaction. Callers queue on a fair gate, so exactly one transaction is in
//! flight per manager; the channel is opened when a transaction starts and
//! unconditionally closed when it resolves.
//!
//! Byte reception is driven by a reader task that forwards chunks over a
//! bounded queue to the accumulating transaction, which completes on the first
//! of three triggers: an ETX control byte in the buffer, line silence with a
//! non-empty buffer, or the overall deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf};
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::commands::{frame_command, Command};
use super::link::{ChannelOpener, SerialLink, SerialOpener};
use super::{ProtocolError, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT_MS, ETX, INACTIVITY_QUANTUM_MS};

/// Read buffer size for the reader task
const READ_CHUNK_SIZE: usize = 512;

/// Depth of the chunk queue between the reader task and the transaction
const CHUNK_QUEUE_DEPTH: usize = 32;

/// Capacity of the observer event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Serial port name
    pub port_name: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Per-command response timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Session state, observable through [`SessionManager::state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No transaction in flight
    Idle,
    /// Opening the serial channel
    Opening,
    /// Command written, waiting for the first response byte
    Sent,
    /// Response bytes are being accumulated
    Accumulating,
    /// Transaction resolved with a complete response
    Completed,
    /// Transaction resolved by the overall deadline
    TimedOut,
    /// Transaction failed (open or write error)
    Failed,
    /// Channel closed after resolution
    Closed,
}

/// Notifications emitted while a transaction is in flight
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A raw chunk arrived from the console
    Chunk(Vec<u8>),
    /// A transaction resolved with this complete response
    Response(String),
}

/// The one outstanding command on the channel.
///
/// The outcome cell accepts exactly one write; whichever completion trigger
/// fires first wins and later attempts are ignored.
struct PendingTransaction {
    deadline: Instant,
    buffer: Vec<u8>,
    resolved: bool,
}

impl PendingTransaction {
    fn new(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            buffer: Vec::new(),
            resolved: false,
        }
    }

    fn push_chunk(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    fn has_data(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn saw_terminator(&self) -> bool {
        self.buffer.contains(&ETX)
    }

    /// Resolve with the accumulated buffer; `None` if already resolved
    fn resolve_complete(&mut self) -> Option<String> {
        if self.resolved {
            return None;
        }
        self.resolved = true;
        Some(String::from_utf8_lossy(&self.buffer).into_owned())
    }

    /// Resolve as timed out; `false` if already resolved
    fn resolve_timeout(&mut self) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        true
    }
}

/// Serializes command/response transactions against one ATG console
pub struct SessionManager {
    config: SessionConfig,
    opener: Box<dyn ChannelOpener>,
    gate: Mutex<()>,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    /// Create a session manager for a real serial port
    pub fn new(config: SessionConfig) -> Self {
        Self::with_opener(config, Box::new(SerialOpener))
    }

    /// Create a session manager with a custom channel opener
    pub fn with_opener(config: SessionConfig, opener: Box<dyn ChannelOpener>) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            opener,
            gate: Mutex::new(()),
            state,
            events,
        }
    }

    /// Get the session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the current session state
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch session state transitions
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Subscribe to raw chunk and response notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Send a well-known query using the configured timeout
    pub async fn query(&self, command: Command) -> Result<String, ProtocolError> {
        // Commands with large payloads carry their own timeout floor
        let timeout_ms = self.config.timeout_ms.max(command.timeout_ms());
        self.send_command(command.wire_str(), timeout_ms).await
    }

    /// Execute one command/response transaction.
    ///
    /// Concurrent callers block in FIFO order; the channel is opened at the
    /// start of the transaction and closed on every exit path before control
    /// returns to the caller.
    pub async fn send_command(
        &self,
        command: &str,
        timeout_ms: u64,
    ) -> Result<String, ProtocolError> {
        let _gate = self.gate.lock().await;

        self.set_state(SessionState::Opening);
        let link = match self
            .opener
            .open(&self.config.port_name, self.config.baud_rate)
            .await
        {
            Ok(link) => link,
            Err(e) => {
                // Fail fast: no transaction was created
                warn!(port = %self.config.port_name, "channel open failed: {}", e);
                self.set_state(SessionState::Failed);
                self.set_state(SessionState::Closed);
                return Err(e);
            }
        };

        let result = self
            .run_transaction(link, command, Duration::from_millis(timeout_ms))
            .await;

        self.set_state(SessionState::Closed);
        result
    }

    async fn run_transaction(
        &self,
        link: Box<dyn SerialLink>,
        command: &str,
        timeout: Duration,
    ) -> Result<String, ProtocolError> {
        let mut txn = PendingTransaction::new(timeout);
        let (read_half, mut write_half) = tokio::io::split(link);

        let cancel = CancellationToken::new();
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_QUEUE_DEPTH);
        let reader = tokio::spawn(read_loop(read_half, chunk_tx, cancel.clone()));

        self.set_state(SessionState::Sent);
        let frame = frame_command(command);
        debug!(command, bytes = frame.len(), "sending framed command");
        let written = async {
            write_half.write_all(&frame).await?;
            write_half.flush().await
        }
        .await;

        let result = match written {
            Err(e) => {
                self.set_state(SessionState::Failed);
                Err(ProtocolError::SerialError(e.to_string()))
            }
            Ok(()) => {
                self.set_state(SessionState::Accumulating);
                match tokio::time::timeout_at(txn.deadline, self.accumulate(&mut txn, chunk_rx))
                    .await
                {
                    Ok(Ok(raw)) => {
                        debug!(command, len = raw.len(), "transaction complete");
                        self.set_state(SessionState::Completed);
                        let _ = self.events.send(SessionEvent::Response(raw.clone()));
                        Ok(raw)
                    }
                    Ok(Err(e)) => {
                        self.set_state(SessionState::Failed);
                        Err(e)
                    }
                    Err(_) => {
                        txn.resolve_timeout();
                        warn!(command, timeout_ms = timeout.as_millis() as u64, "transaction timed out");
                        self.set_state(SessionState::TimedOut);
                        Err(ProtocolError::Timeout)
                    }
                }
            }
        };

        // Tear the channel down before handing control back to the caller
        cancel.cancel();
        drop(write_half);
        let _ = reader.await;

        result
    }

    /// Accumulate chunks until a completion trigger fires.
    ///
    /// This is the only writer of the transaction buffer; the reader task
    /// never touches shared state directly.
    async fn accumulate(
        &self,
        txn: &mut PendingTransaction,
        mut chunks: mpsc::Receiver<Vec<u8>>,
    ) -> Result<String, ProtocolError> {
        let quantum = Duration::from_millis(INACTIVITY_QUANTUM_MS);

        loop {
            match tokio::time::timeout(quantum, chunks.recv()).await {
                Ok(Some(chunk)) => {
                    debug!(len = chunk.len(), "chunk received");
                    txn.push_chunk(&chunk);
                    let _ = self.events.send(SessionEvent::Chunk(chunk));
                    if txn.saw_terminator() {
                        if let Some(raw) = txn.resolve_complete() {
                            return Ok(raw);
                        }
                    }
                }
                Ok(None) => {
                    // Driver closed the link; whatever accumulated is the response
                    if txn.has_data() {
                        if let Some(raw) = txn.resolve_complete() {
                            return Ok(raw);
                        }
                    }
                    return Err(ProtocolError::ChannelClosed);
                }
                Err(_) => {
                    // Line silence: a non-empty buffer is a complete response.
                    // An empty one keeps waiting for the first byte until the
                    // overall deadline fires.
                    if txn.has_data() {
                        if let Some(raw) = txn.resolve_complete() {
                            return Ok(raw);
                        }
                    }
                }
            }
        }
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }
}

/// Forward bytes from the read half to the transaction's chunk queue
async fn read_loop(
    mut read_half: ReadHalf<Box<dyn SerialLink>>,
    chunks: mpsc::Sender<Vec<u8>>,
    cancel: CancellationToken,
) {
    let mut buf = [0u8; READ_CHUNK_SIZE];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            read = read_half.read(&mut buf) => match read {
                Ok(0) => break,
                Ok(n) => {
                    if chunks.send(buf[..n].to_vec()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("serial read error: {}", e);
                    break;
                }
            },
        }
    }
}
