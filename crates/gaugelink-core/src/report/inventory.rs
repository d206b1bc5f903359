//! Inventory report decoding
//!
//! Decodes the `i20100` in-tank inventory response: a report timestamp, a
//! walk of fixed-width tank entries whose declared field count drives how many
//! hex-float measurements follow, and a trailing checksum after the `&&`
//! terminator.

use crate::protocol::DATA_TERMINATOR;

use super::cursor::Cursor;
use super::error::DecodeError;
use super::{at_terminator, report_timestamp, sanitize, InventoryReport, TankSnapshot, BODY_OFFSET};

/// Decode a raw `i20100` response into an [`InventoryReport`]
pub fn decode_inventory(raw: &str) -> Result<InventoryReport, DecodeError> {
    let payload = sanitize(raw)?;
    let recorded_at = report_timestamp(payload)?;

    // Everything after the last terminator is the checksum; it is extracted
    // as-is and never verified
    let split = payload
        .rfind(DATA_TERMINATOR)
        .ok_or(DecodeError::MissingTerminator)?;
    let body = &payload[..split];
    let checksum = payload[split + DATA_TERMINATOR.len()..].to_string();

    let mut cur = Cursor::at(body, BODY_OFFSET);
    let mut tanks = Vec::new();
    loop {
        if cur.remaining() < DATA_TERMINATOR.len() || at_terminator(&cur) {
            break;
        }
        match read_snapshot(&mut cur) {
            Ok(snapshot) => tanks.push(snapshot),
            // Running out of payload ends the walk; it is not an error
            Err(DecodeError::Truncated { .. }) => break,
            Err(e) => return Err(e),
        }
    }

    Ok(InventoryReport {
        recorded_at,
        tanks,
        checksum,
    })
}

/// Read one tank entry: 9-character header, then `field_count` hex floats in
/// fixed semantic order
fn read_snapshot(cur: &mut Cursor<'_>) -> Result<TankSnapshot, DecodeError> {
    let tank_number = cur.take_decimal_u8(2)?;
    let product_code = cur.take_char()?;
    let status = cur.take_hex_u16(4)?;
    let field_count = cur.take_hex_u8(2)?;

    let mut snapshot = TankSnapshot::new(tank_number, product_code, status, field_count);
    for position in 1..=field_count {
        let value = cur.take_f32()?;
        match position {
            1 => snapshot.volume = Some(value),
            2 => snapshot.tc_volume = Some(value),
            3 => snapshot.ullage = Some(value),
            4 => snapshot.height = Some(value),
            5 => snapshot.water = Some(value),
            6 => snapshot.temperature = Some(value),
            7 => snapshot.water_volume = Some(value),
            // Positions beyond the known seven are consumed and discarded
            _ => {}
        }
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn hex(value: f32) -> String {
        format!("{:08X}", value.to_bits())
    }

    fn wrap(payload: &str) -> String {
        format!("\u{1}{payload}\u{3}")
    }

    fn two_tank_response() -> String {
        wrap(&[
            "i20100",
            "2501011200",
            // tank 1: volume + tc-volume
            "01",
            "1",
            "0000",
            "02",
            &hex(1000.0),
            &hex(250.25),
            // tank 2: volume only
            "02",
            "2",
            "0000",
            "01",
            &hex(100.0),
            "&&",
            "FB2B",
        ]
        .concat())
    }

    #[test]
    fn test_two_tanks_with_partial_field_counts() {
        let report = decode_inventory(&two_tank_response()).unwrap();

        assert_eq!(
            report.recorded_at,
            NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        );
        assert_eq!(report.checksum, "FB2B");
        assert_eq!(report.tanks.len(), 2);

        let t1 = &report.tanks[0];
        assert_eq!(t1.tank_number, 1);
        assert_eq!(t1.product_code, '1');
        assert_eq!(t1.field_count, 2);
        assert_eq!(t1.volume, Some(1000.0));
        assert_eq!(t1.tc_volume, Some(250.25));
        assert_eq!(t1.ullage, None);
        assert_eq!(t1.height, None);
        assert_eq!(t1.water, None);
        assert_eq!(t1.temperature, None);
        assert_eq!(t1.water_volume, None);

        let t2 = &report.tanks[1];
        assert_eq!(t2.tank_number, 2);
        assert_eq!(t2.volume, Some(100.0));
        assert_eq!(t2.tc_volume, None);
    }

    #[test]
    fn test_all_seven_fields() {
        let payload = [
            "i20100",
            "2501011200",
            "01",
            "1",
            "0001",
            "07",
            &hex(1000.0),
            &hex(995.5),
            &hex(500.0),
            &hex(48.25),
            &hex(0.5),
            &hex(15.5),
            &hex(2.0),
            "&&",
            "AB01",
        ]
        .concat();
        let report = decode_inventory(&wrap(&payload)).unwrap();

        let tank = &report.tanks[0];
        assert_eq!(tank.status, 0x0001);
        assert_eq!(tank.volume, Some(1000.0));
        assert_eq!(tank.tc_volume, Some(995.5));
        assert_eq!(tank.ullage, Some(500.0));
        assert_eq!(tank.height, Some(48.25));
        assert_eq!(tank.water, Some(0.5));
        assert_eq!(tank.temperature, Some(15.5));
        assert_eq!(tank.water_volume, Some(2.0));
    }

    #[test]
    fn test_terminator_at_first_tank_yields_empty_list() {
        let report = decode_inventory(&wrap("i201002501011200&&FB2B")).unwrap();
        assert!(report.tanks.is_empty());
        assert_eq!(report.checksum, "FB2B");
    }

    #[test]
    fn test_body_shorter_than_tank_header_yields_empty_list() {
        // Three stray characters: not enough for the 9-character header
        let report = decode_inventory(&wrap("i20100250101120001A&&FB2B")).unwrap();
        assert!(report.tanks.is_empty());
    }

    #[test]
    fn test_truncated_tank_ends_walk_without_partial_entry() {
        // Second tank declares three floats but only one fits before the
        // terminator
        let payload = [
            "i20100",
            "2501011200",
            "01",
            "1",
            "0000",
            "01",
            &hex(1000.0),
            "03",
            "1",
            "0000",
            "03",
            &hex(42.0),
            "&&",
            "FB2B",
        ]
        .concat();
        let report = decode_inventory(&wrap(&payload)).unwrap();
        assert_eq!(report.tanks.len(), 1);
        assert_eq!(report.tanks[0].tank_number, 1);
    }

    #[test]
    fn test_inner_terminator_stops_walk_early() {
        let payload = [
            "i20100",
            "2501011200",
            "01",
            "1",
            "0000",
            "01",
            &hex(1000.0),
            "&&",
            "unrelated-trailer",
            "&&",
            "FB2B",
        ]
        .concat();
        let report = decode_inventory(&wrap(&payload)).unwrap();
        assert_eq!(report.tanks.len(), 1);
        assert_eq!(report.checksum, "FB2B");
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert_eq!(decode_inventory(""), Err(DecodeError::EmptyInput));
        assert_eq!(decode_inventory("\u{1}\u{3}"), Err(DecodeError::EmptyInput));
    }

    #[test]
    fn test_bad_timestamp_aborts_decode() {
        let raw = wrap("i20100@@@@@@@@@@011000001&&FB2B");
        assert!(matches!(
            decode_inventory(&raw),
            Err(DecodeError::BadTimestamp { .. })
        ));
    }

    #[test]
    fn test_non_hex_status_aborts_decode() {
        let payload = ["i20100", "2501011200", "01", "1", "ZZZZ", "01", "&&", "FB2B"].concat();
        assert!(matches!(
            decode_inventory(&wrap(&payload)),
            Err(DecodeError::BadHexField { .. })
        ));
    }

    #[test]
    fn test_missing_terminator_is_structural_error() {
        let raw = wrap("i201002501011200011000001");
        assert_eq!(decode_inventory(&raw), Err(DecodeError::MissingTerminator));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let raw = two_tank_response();
        assert_eq!(
            decode_inventory(&raw).unwrap(),
            decode_inventory(&raw).unwrap()
        );
    }
}
