//! Serial Protocol Communication
//!
//! Implements the TLS-style ATG console protocol: commands are framed with a
//! leading SOH control byte, responses are ASCII/hex payloads terminated by an
//! ETX control byte or by line silence.

pub mod commands;
mod error;
pub mod link;
pub mod serial;
mod session;

pub use commands::Command;
pub use error::ProtocolError;
pub use link::{ChannelOpener, SerialLink, SerialOpener};
pub use serial::{list_ports, PortInfo};
pub use session::{SessionConfig, SessionEvent, SessionManager, SessionState};

/// Start-of-heading control byte prefixed to every outgoing command
pub const SOH: u8 = 0x01;

/// End-of-text control byte terminating a complete console response
pub const ETX: u8 = 0x03;

/// Two-character sequence ending the data block of a report payload
pub const DATA_TERMINATOR: &str = "&&";

/// Default baud rate for ATG console links
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default per-command response timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Line-silence quantum: an accumulated, non-empty buffer is treated as a
/// complete response once no bytes arrive for this long.
pub const INACTIVITY_QUANTUM_MS: u64 = 300;
