//! Timestamps encoded as `"HH:MM Weekday DD Month"` with the year omitted

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc, Weekday};

use super::{DecodeError, unquote};

/// Literal sent instead of a timestamp when the upstream cannot estimate one.
pub const UNKNOWN_DATE: &str = "unknown";

/// `"unknown"` resolves this many days past the decode time so it sorts last.
pub const UNKNOWN_OFFSET_DAYS: i64 = 366;

const LAYOUT: &str = "%H:%M %d %b %Y";

/// A timestamp decoded from text, keeping the text for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDate {
    pub time: DateTime<Utc>,
    pub raw: String,
}

impl DecodedDate {
    /// Decode relative to the current time.
    ///
    /// Both the `"unknown"` sentinel and the implied year depend on when the
    /// call happens, so the result is never cached.
    pub fn parse(s: &str) -> Result<Self, DecodeError> {
        Self::parse_at(s, Utc::now())
    }

    /// Decode relative to `now`.
    pub fn parse_at(s: &str, now: DateTime<Utc>) -> Result<Self, DecodeError> {
        let raw = unquote(s);

        if raw == UNKNOWN_DATE {
            return Ok(DecodedDate {
                time: now + Duration::days(UNKNOWN_OFFSET_DAYS),
                raw: raw.to_string(),
            });
        }

        let invalid = |reason: String| DecodeError::InvalidTimestamp {
            input: raw.to_string(),
            reason,
        };

        let fields: Vec<&str> = raw.split_whitespace().collect();
        let &[clock, weekday, day, month] = fields.as_slice() else {
            return Err(invalid(format!(
                "expected 4 fields (HH:MM Weekday DD Month), found {}",
                fields.len()
            )));
        };

        // The weekday is checked for syntax only; it need not agree with the date.
        weekday
            .parse::<Weekday>()
            .map_err(|_| invalid(format!("unknown weekday {weekday:?}")))?;

        let text = format!("{clock} {day} {month} {}", now.year());
        let naive = NaiveDateTime::parse_from_str(&text, LAYOUT)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(DecodedDate {
            time: naive.and_utc(),
            raw: raw.to_string(),
        })
    }

    pub fn is_unknown(&self) -> bool {
        self.raw == UNKNOWN_DATE
    }
}

impl FromStr for DecodedDate {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DecodedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_unknown_is_far_future() {
        let now = Utc::now();
        let date: DecodedDate = "unknown".parse().unwrap();
        assert!(date.time >= now + Duration::days(365));
        assert!(date.is_unknown());
    }

    #[test]
    fn test_unknown_quoted() {
        let date = DecodedDate::parse_at("\"unknown\"", fixed_now()).unwrap();
        assert_eq!(date.time, fixed_now() + Duration::days(UNKNOWN_OFFSET_DAYS));
    }

    #[test]
    fn test_well_formed_uses_current_year() {
        let date = DecodedDate::parse_at("13:42 Sun 17 Oct", fixed_now()).unwrap();
        assert_eq!(date.time.year(), 2026);
        assert_eq!(date.time.month(), 10);
        assert_eq!(date.time.day(), 17);
        assert_eq!(date.time.hour(), 13);
        assert_eq!(date.time.minute(), 42);
        assert_eq!(date.raw, "13:42 Sun 17 Oct");
        assert!(!date.is_unknown());
    }

    #[test]
    fn test_parse_tracks_wall_clock_year() {
        let date: DecodedDate = "09:05 Mon 03 Feb".parse().unwrap();
        assert_eq!(date.time.year(), Utc::now().year());
        assert_eq!(date.time.month(), 2);
        assert_eq!(date.time.day(), 3);
        assert_eq!(date.time.hour(), 9);
        assert_eq!(date.time.minute(), 5);
    }

    #[test]
    fn test_bad_weekday() {
        let err = DecodedDate::parse_at("13:42 Xyz 17 Oct", fixed_now()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_malformed() {
        for input in ["", "tomorrow", "25:99 Sun 17 Oct", "13:42 Sun 40 Oct", "13:42 Sun 17 Foo"] {
            assert!(
                matches!(
                    DecodedDate::parse_at(input, fixed_now()),
                    Err(DecodeError::InvalidTimestamp { .. })
                ),
                "{input:?} should fail"
            );
        }
    }
}
