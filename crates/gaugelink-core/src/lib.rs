//! # GaugeLink Core Library
//!
//! Core functionality for communicating with TLS-compatible automatic tank
//! gauge (ATG) consoles over a half-duplex serial link.
//!
//! This library provides:
//! - A transaction-oriented serial session manager with terminator and
//!   line-silence completion detection
//! - Decoders for the console's fixed-width ASCII/hex inventory and delivery
//!   report formats
//! - Typed, serializable report structures for downstream consumers
//!
//! HTTP exposure, persistence and job scheduling are left to the applications
//! embedding this crate; they call [`protocol::SessionManager::send_command`]
//! and feed the raw response into [`report::decode_inventory`] or
//! [`report::decode_delivery`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use gaugelink_core::protocol::{Command, SessionConfig, SessionManager};
//! use gaugelink_core::report::decode_inventory;
//!
//! let config = SessionConfig {
//!     port_name: "/dev/ttyUSB0".to_string(),
//!     ..Default::default()
//! };
//! let session = SessionManager::new(config);
//!
//! let raw = session.query(Command::InventoryQuery).await?;
//! let report = decode_inventory(&raw)?;
//! for tank in &report.tanks {
//!     println!("tank {}: {:?} gal", tank.tank_number, tank.volume);
//! }
//! ```

#![warn(missing_docs)]

pub mod protocol;
pub mod report;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::protocol::{
        Command, ProtocolError, SessionConfig, SessionEvent, SessionManager, SessionState,
    };
    pub use crate::report::{
        decode_delivery, decode_inventory, DecodeError, DeliveryEvent, DeliveryRecord,
        DeliveryReport, InventoryReport, TankSnapshot,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
