//! Address Range Types
//!
//! A half-open `[start, end)` span of virtual addresses, and address parsing.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("range starting at {start:#x} is empty")]
    Empty { start: u64 },

    #[error("end {end:#x} is below start {start:#x}")]
    Inverted { start: u64, end: u64 },

    #[error("range length {len:#x} is larger than any buffer on this platform")]
    TooLarge { len: u64 },

    #[error("invalid address: {0:?}")]
    BadAddress(String),

    #[error("invalid range {0:?}, expected <start>-<end> or <start>..<end>")]
    BadRange(String),
}

/// A validated, non-empty `[start, end)` address range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    start: u64,
    end: u64,
}

impl AddressRange {
    /// Create a range, rejecting empty and inverted bounds
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if end == start {
            return Err(RangeError::Empty { start });
        }
        if end < start {
            return Err(RangeError::Inverted { start, end });
        }

        // Buffers are capped at isize::MAX bytes
        let len = end - start;
        if usize::try_from(len).is_err() || len > isize::MAX as u64 {
            return Err(RangeError::TooLarge { len });
        }

        Ok(AddressRange { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered (`end - start`)
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Always false; empty ranges cannot be constructed
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Length as a buffer size. Checked against `isize::MAX` in [`AddressRange::new`].
    pub fn byte_len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}-{:#x}", self.start, self.end)
    }
}

impl FromStr for AddressRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once("..")
            .or_else(|| s.split_once('-'))
            .ok_or_else(|| RangeError::BadRange(s.to_string()))?;

        AddressRange::new(parse_address(start)?, parse_address(end)?)
    }
}

/// Parse a hex (`0x` prefix) or decimal address string
///
/// Underscore separators are allowed, e.g. `0x0EB4_3A80`.
pub fn parse_address(address: &str) -> Result<u64, RangeError> {
    let trimmed = address.trim();
    let cleaned: String = trimmed.chars().filter(|&c| c != '_').collect();

    let parsed = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else {
        cleaned.parse::<u64>()
    };

    parsed.map_err(|_| RangeError::BadAddress(trimmed.to_string()))
}
