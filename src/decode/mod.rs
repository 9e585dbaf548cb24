//! Decoders for the quirky scalar encodings some upstream APIs emit
//!
//! SABnzbd reports byte counts as unit-suffixed strings (`"701.3 MB"`),
//! timestamps as `"13:42 Sun 17 Oct"` with no year (or the literal
//! `"unknown"`), and plain numbers wrapped in JSON strings.

mod date;
mod size;

pub use date::{DecodedDate, UNKNOWN_DATE, UNKNOWN_OFFSET_DAYS};
pub use size::DecodedSize;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not convert to number: {input}: {source}")]
    InvalidNumber {
        input: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("byte count out of range: {0}")]
    SizeOutOfRange(String),

    #[error("unknown byte type: {0}")]
    UnknownUnit(String),

    #[error("invalid time: {input}: {reason}")]
    InvalidTimestamp { input: String, reason: String },
}

/// Strip the JSON quoting that sometimes survives into raw field text.
pub(crate) fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

/// Deserialize a float that may arrive either as a JSON number or as a
/// numeric string (`"593.67"`). Empty strings decode as zero.
pub fn float_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0.0),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Slot {
        #[serde(deserialize_with = "float_string")]
        mbleft: f64,
    }

    #[test]
    fn test_float_string_accepts_text() {
        let slot: Slot = serde_json::from_str(r#"{"mbleft": "593.67"}"#).unwrap();
        assert!((slot.mbleft - 593.67).abs() < f64::EPSILON);
    }

    #[test]
    fn test_float_string_accepts_number() {
        let slot: Slot = serde_json::from_str(r#"{"mbleft": 12.5}"#).unwrap();
        assert!((slot.mbleft - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_float_string_empty_is_zero() {
        let slot: Slot = serde_json::from_str(r#"{"mbleft": ""}"#).unwrap();
        assert_eq!(slot.mbleft, 0.0);
    }

    #[test]
    fn test_float_string_rejects_garbage() {
        assert!(serde_json::from_str::<Slot>(r#"{"mbleft": "lots"}"#).is_err());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"701.3 MB\""), "701.3 MB");
        assert_eq!(unquote("unknown"), "unknown");
    }
}
