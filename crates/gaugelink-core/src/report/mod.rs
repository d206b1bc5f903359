//! Report decoding
//!
//! Turns raw console responses into structured, timestamped reports. The
//! decoders are pure functions over the raw string; they share the
//! fixed-width cursor primitives and never produce partial reports.

mod cursor;
mod delivery;
mod error;
mod inventory;

pub use delivery::decode_delivery;
pub use error::DecodeError;
pub use inventory::decode_inventory;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::protocol::DATA_TERMINATOR;
use self::cursor::Cursor;

/// Offset of the report timestamp window in the sanitized payload
pub(crate) const TIMESTAMP_OFFSET: usize = 6;

/// Offset where the tank/record walk begins in the sanitized payload
pub(crate) const BODY_OFFSET: usize = 16;

/// Point-in-time measurements for one tank.
///
/// Which measurements are present is driven by the report's declared field
/// count; fields not covered by it stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    /// Tank number as configured on the console
    pub tank_number: u8,
    /// Product code character assigned to the tank
    pub product_code: char,
    /// Raw tank status bits
    pub status: u16,
    /// Declared number of measurement fields that followed
    pub field_count: u8,
    /// Gross product volume
    pub volume: Option<f32>,
    /// Temperature-compensated volume
    pub tc_volume: Option<f32>,
    /// Remaining capacity
    pub ullage: Option<f32>,
    /// Product height
    pub height: Option<f32>,
    /// Water height
    pub water: Option<f32>,
    /// Product temperature
    pub temperature: Option<f32>,
    /// Water volume
    pub water_volume: Option<f32>,
}

impl TankSnapshot {
    /// Snapshot with no measurements set
    pub fn new(tank_number: u8, product_code: char, status: u16, field_count: u8) -> Self {
        Self {
            tank_number,
            product_code,
            status,
            field_count,
            volume: None,
            tc_volume: None,
            ullage: None,
            height: None,
            water: None,
            temperature: None,
            water_volume: None,
        }
    }
}

/// Decoded in-tank inventory report (`i20100`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    /// Timestamp the console stamped on the report
    pub recorded_at: NaiveDateTime,
    /// Per-tank snapshots in report order
    pub tanks: Vec<TankSnapshot>,
    /// Checksum text following the data terminator; extracted, not verified
    pub checksum: String,
}

/// One delivery: tank state at the start and end of the drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    /// When the delivery started
    pub started_at: NaiveDateTime,
    /// When the delivery ended
    pub ended_at: NaiveDateTime,
    /// Tank state at the start of the delivery
    pub start: TankSnapshot,
    /// Tank state at the end of the delivery
    pub end: TankSnapshot,
}

/// All deliveries reported for one tank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Tank number as configured on the console
    pub tank_number: u8,
    /// Product code character assigned to the tank
    pub product_code: char,
    /// Declared event count; always equals `events.len()`
    pub event_count: u8,
    /// Delivery events in report order
    pub events: Vec<DeliveryEvent>,
}

/// Decoded delivery report (`i20200`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Timestamp the console stamped on the report
    pub recorded_at: NaiveDateTime,
    /// Per-tank delivery records in report order
    pub records: Vec<DeliveryRecord>,
}

/// Strip leading/trailing control-byte framing (SOH, ETX, line endings)
pub(crate) fn sanitize(raw: &str) -> Result<&str, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    let trimmed = raw.trim_matches(|c: char| c.is_control() || c.is_whitespace());
    if trimmed.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    Ok(trimmed)
}

/// Parse the report timestamp from its fixed window
pub(crate) fn report_timestamp(payload: &str) -> Result<NaiveDateTime, DecodeError> {
    Cursor::at(payload, TIMESTAMP_OFFSET).take_timestamp()
}

/// True when the cursor sits on the `&&` data terminator
pub(crate) fn at_terminator(cur: &Cursor<'_>) -> bool {
    cur.peek(DATA_TERMINATOR.len()) == Some(DATA_TERMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitize_strips_framing() {
        let raw = "\u{1}i201002501011200body&&FB2B\u{3}\r\n";
        assert_eq!(sanitize(raw).unwrap(), "i201002501011200body&&FB2B");
    }

    #[test]
    fn test_sanitize_rejects_empty() {
        assert_eq!(sanitize(""), Err(DecodeError::EmptyInput));
        assert_eq!(sanitize("\u{1}\u{3}\r\n"), Err(DecodeError::EmptyInput));
    }

    #[test]
    fn test_snapshot_starts_unmeasured() {
        let snap = TankSnapshot::new(1, '1', 0, 0);
        assert_eq!(snap.volume, None);
        assert_eq!(snap.water_volume, None);
    }

    #[test]
    fn test_reports_serialize_for_collaborators() {
        let snap = TankSnapshot {
            volume: Some(1000.0),
            ..TankSnapshot::new(1, '1', 0, 1)
        };
        let report = InventoryReport {
            recorded_at: chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            tanks: vec![snap],
            checksum: "FB2B".to_string(),
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: InventoryReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
