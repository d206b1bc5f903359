//! Delivery report decoding
//!
//! Decodes the `i20200` delivery response: per tank, a declared number of
//! delivery events, each carrying start/end timestamps and a field count that
//! drives how many positional hex-float measurements follow. Unlike the
//! inventory format there is no checksum carve-out; the `&&` terminator only
//! ends the walk.

use crate::protocol::DATA_TERMINATOR;

use super::cursor::Cursor;
use super::error::DecodeError;
use super::{
    at_terminator, report_timestamp, sanitize, DeliveryEvent, DeliveryRecord, DeliveryReport,
    TankSnapshot, BODY_OFFSET,
};

/// Decode a raw `i20200` response into a [`DeliveryReport`]
pub fn decode_delivery(raw: &str) -> Result<DeliveryReport, DecodeError> {
    let payload = sanitize(raw)?;
    let recorded_at = report_timestamp(payload)?;

    let mut cur = Cursor::at(payload, BODY_OFFSET);
    let mut records = Vec::new();
    loop {
        if cur.remaining() < DATA_TERMINATOR.len() || at_terminator(&cur) {
            break;
        }
        match read_record(&mut cur) {
            Ok(record) => records.push(record),
            // Running out of payload drops the partial record and ends the
            // walk, so every kept record holds its full declared event count
            Err(DecodeError::Truncated { .. }) => break,
            Err(e) => return Err(e),
        }
    }

    Ok(DeliveryReport {
        recorded_at,
        records,
    })
}

/// Read one tank record: 5-character header, then the declared events
fn read_record(cur: &mut Cursor<'_>) -> Result<DeliveryRecord, DecodeError> {
    let tank_number = cur.take_decimal_u8(2)?;
    let product_code = cur.take_char()?;
    let event_count = cur.take_hex_u8(2)?;

    let mut events = Vec::with_capacity(event_count as usize);
    for _ in 0..event_count {
        events.push(read_event(cur, tank_number, product_code)?);
    }

    Ok(DeliveryRecord {
        tank_number,
        product_code,
        event_count,
        events,
    })
}

fn read_event(
    cur: &mut Cursor<'_>,
    tank_number: u8,
    product_code: char,
) -> Result<DeliveryEvent, DecodeError> {
    let started_at = cur.take_timestamp()?;
    let ended_at = cur.take_timestamp()?;
    let field_count = cur.take_hex_u8(2)?;

    let mut start = TankSnapshot::new(tank_number, product_code, 0, field_count);
    let mut end = start.clone();
    for position in 1..=field_count {
        let value = cur.take_f32()?;
        match position {
            1 => start.volume = Some(value),
            2 => start.tc_volume = Some(value),
            3 => start.water = Some(value),
            4 => start.temperature = Some(value),
            5 => end.volume = Some(value),
            6 => end.tc_volume = Some(value),
            7 => end.water = Some(value),
            8 => end.temperature = Some(value),
            9 => start.height = Some(value),
            10 => end.height = Some(value),
            // Positions beyond ten are consumed and discarded
            _ => {}
        }
    }

    Ok(DeliveryEvent {
        started_at,
        ended_at,
        start,
        end,
    })
}
