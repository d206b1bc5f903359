//! Protocol errors

use thiserror::Error;

/// Errors that can occur during console communication
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The serial channel could not be opened
    #[error("Failed to open {port}: {message}")]
    ConnectionFailed {
        /// Configured port name
        port: String,
        /// Underlying driver error text
        message: String,
    },

    /// The channel failed mid-transaction (write or driver error)
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// No completion trigger fired within the caller's deadline
    #[error("Response timeout")]
    Timeout,

    /// The driver closed the channel before any response data arrived
    #[error("Channel closed before any response data arrived")]
    ChannelClosed,

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
