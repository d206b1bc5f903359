//! Report decoding errors

use thiserror::Error;

/// Errors that can occur while decoding a console report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The raw response was empty, or nothing remained after stripping framing
    #[error("Empty response")]
    EmptyInput,

    /// A fixed-width read ran past the end of the payload
    #[error("Response truncated at offset {offset}: needed {needed} chars, {available} available")]
    Truncated {
        /// Cursor position of the failed read
        offset: usize,
        /// Characters the read required
        needed: usize,
        /// Characters actually remaining
        available: usize,
    },

    /// A `yyMMddHHmm` window did not parse as a timestamp
    #[error("Invalid timestamp: '{value}'")]
    BadTimestamp {
        /// The offending window
        value: String,
    },

    /// A hex-encoded field contained non-hex characters
    #[error("Invalid hex field: '{value}'")]
    BadHexField {
        /// The offending window
        value: String,
    },

    /// A decimal field contained non-digit characters
    #[error("Invalid numeric field: '{value}'")]
    BadNumber {
        /// The offending window
        value: String,
    },

    /// The inventory payload carried no `&&` terminator to split body from
    /// checksum
    #[error("Missing '&&' data terminator")]
    MissingTerminator,
}
