//! Protocol commands
//!
//! Defines the console query commands understood by this library. The console
//! speaks the "computer format" command set: a function code string framed
//! with a leading SOH control byte.

use serde::{Deserialize, Serialize};

use super::SOH;

/// Console query commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// In-tank inventory query (`i20100`)
    InventoryQuery,

    /// Delivery report query (`i20200`)
    DeliveryQuery,
}

impl Command {
    /// Get the on-wire function code for this command
    pub fn wire_str(&self) -> &'static str {
        match self {
            Command::InventoryQuery => "i20100",
            Command::DeliveryQuery => "i20200",
        }
    }

    /// Frame the command for transmission: `<SOH><function-code>`
    pub fn frame(&self) -> Vec<u8> {
        frame_command(self.wire_str())
    }

    /// Expected response timeout in milliseconds
    pub fn timeout_ms(&self) -> u64 {
        match self {
            // Delivery history payloads can span many events per tank
            Command::DeliveryQuery => 10_000,
            Command::InventoryQuery => super::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Frame an arbitrary command string with the leading SOH control byte
pub fn frame_command(command: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1 + command.len());
    bytes.push(SOH);
    bytes.extend_from_slice(command.as_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes() {
        assert_eq!(Command::InventoryQuery.wire_str(), "i20100");
        assert_eq!(Command::DeliveryQuery.wire_str(), "i20200");
    }

    #[test]
    fn test_framing() {
        let frame = Command::InventoryQuery.frame();
        assert_eq!(frame[0], SOH);
        assert_eq!(&frame[1..], b"i20100");
    }

    #[test]
    fn test_frame_arbitrary_command() {
        let frame = frame_command("i20300");
        assert_eq!(frame, [&[SOH][..], &b"i20300"[..]].concat());
    }
}
