//! Byte counts encoded as `"<number>[ <unit>]"` strings

use std::fmt;
use std::str::FromStr;

use super::{DecodeError, unquote};

const KILOBYTE: f64 = 1024.0;
const MEGABYTE: f64 = KILOBYTE * KILOBYTE;
const GIGABYTE: f64 = MEGABYTE * KILOBYTE;
const TERABYTE: f64 = MEGABYTE * MEGABYTE;

/// A byte count decoded from text, keeping the text for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedSize {
    pub bytes: u64,
    pub raw: String,
}

impl DecodedSize {
    pub fn as_u64(&self) -> u64 {
        self.bytes
    }

    fn multiplier(unit: &str) -> Result<f64, DecodeError> {
        let multiplier = match unit {
            "B" | "b" | "" => 1.0,
            "K" | "k" | "kb" | "KB" => KILOBYTE,
            "M" | "m" | "mb" | "MB" => MEGABYTE,
            "G" | "g" | "gb" | "GB" => GIGABYTE,
            "T" | "t" | "tb" | "TB" => TERABYTE,
            _ => return Err(DecodeError::UnknownUnit(unit.to_string())),
        };

        Ok(multiplier)
    }
}

impl FromStr for DecodedSize {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = unquote(s);
        let mut parts = raw.split(' ');
        let number = parts.next().unwrap_or_default();

        let quantity: f64 = number.parse().map_err(|source| DecodeError::InvalidNumber {
            input: number.to_string(),
            source,
        })?;

        if !quantity.is_finite() || quantity < 0.0 {
            return Err(DecodeError::SizeOutOfRange(raw.to_string()));
        }

        let multiplier = match parts.next() {
            Some(unit) => Self::multiplier(unit)?,
            None => 1.0,
        };

        // Fractional bytes are floored.
        Ok(DecodedSize {
            bytes: (quantity * multiplier) as u64,
            raw: raw.to_string(),
        })
    }
}

impl fmt::Display for DecodedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
