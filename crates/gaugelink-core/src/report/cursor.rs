//! Fixed-width parsing primitives
//!
//! The report formats are positional with no structured grammar; every read is
//! an explicit `take` over `(input, position)` so the field widths and offsets
//! stay visible at the call site.

use chrono::NaiveDateTime;

use super::error::DecodeError;

/// Timestamp window width in characters
pub(crate) const TIMESTAMP_LEN: usize = 10;

/// Report timestamps: two-digit year, month, day, hour, minute
const TIMESTAMP_FORMAT: &str = "%y%m%d%H%M";

/// Parse a `yyMMddHHmm` timestamp window
pub(crate) fn parse_timestamp(value: &str) -> Result<NaiveDateTime, DecodeError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| DecodeError::BadTimestamp {
        value: value.to_string(),
    })
}

/// A cursor over a fixed-width payload
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Cursor positioned at a fixed offset into the payload
    pub fn at(input: &'a str, pos: usize) -> Self {
        Self { input, pos }
    }

    pub fn remaining(&self) -> usize {
        self.input.len().saturating_sub(self.pos)
    }

    /// Look at the next `n` characters without advancing
    pub fn peek(&self, n: usize) -> Option<&'a str> {
        self.input.get(self.pos..self.pos + n)
    }

    /// Consume the next `n` characters
    pub fn take(&mut self, n: usize) -> Result<&'a str, DecodeError> {
        match self.input.get(self.pos..self.pos + n) {
            Some(window) => {
                self.pos += n;
                Ok(window)
            }
            None => Err(DecodeError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            }),
        }
    }

    pub fn take_char(&mut self) -> Result<char, DecodeError> {
        let window = self.take(1)?;
        window.chars().next().ok_or(DecodeError::Truncated {
            offset: self.pos,
            needed: 1,
            available: 0,
        })
    }

    /// Consume `n` decimal digits
    pub fn take_decimal_u8(&mut self, n: usize) -> Result<u8, DecodeError> {
        let window = self.take(n)?;
        window.parse().map_err(|_| DecodeError::BadNumber {
            value: window.to_string(),
        })
    }

    /// Consume `n` hex digits
    pub fn take_hex_u8(&mut self, n: usize) -> Result<u8, DecodeError> {
        let window = self.take(n)?;
        u8::from_str_radix(window, 16).map_err(|_| DecodeError::BadHexField {
            value: window.to_string(),
        })
    }

    /// Consume `n` hex digits into a u16
    pub fn take_hex_u16(&mut self, n: usize) -> Result<u16, DecodeError> {
        let window = self.take(n)?;
        u16::from_str_radix(window, 16).map_err(|_| DecodeError::BadHexField {
            value: window.to_string(),
        })
    }

    /// Consume 8 hex characters encoding a big-endian IEEE-754 single
    pub fn take_f32(&mut self) -> Result<f32, DecodeError> {
        let window = self.take(8)?;
        let bits = u32::from_str_radix(window, 16).map_err(|_| DecodeError::BadHexField {
            value: window.to_string(),
        })?;
        Ok(f32::from_bits(bits))
    }

    /// Consume a 10-character `yyMMddHHmm` timestamp
    pub fn take_timestamp(&mut self) -> Result<NaiveDateTime, DecodeError> {
        let window = self.take(TIMESTAMP_LEN)?;
        parse_timestamp(window)
    }
}
