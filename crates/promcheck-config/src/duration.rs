//! Durations in the monitoring system's compact notation (`1h30m`, `15s`, `90d`).

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use thiserror::Error;

const MILLISECOND: u64 = 1;
const SECOND: u64 = 1000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const YEAR: u64 = 365 * DAY;

/// Units in the order they must appear in a duration string.
const UNITS: &[(&str, u64)] = &[
    ("y", YEAR),
    ("w", WEEK),
    ("d", DAY),
    ("h", HOUR),
    ("m", MINUTE),
    ("s", SECOND),
    ("ms", MILLISECOND),
];

/// Millisecond-resolution duration.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Duration(u64);

impl Duration {
    pub const fn from_millis(millis: u64) -> Self {
        Duration(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Duration(secs * SECOND)
    }

    pub const fn from_mins(mins: u64) -> Self {
        Duration(mins * MINUTE)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DurationError {
    #[error("empty duration string")]
    Empty,
    #[error("not a valid duration string: {0:?}")]
    Invalid(String),
    #[error("duration out of range: {0:?}")]
    Overflow(String),
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(DurationError::Empty);
        }
        if value == "0" {
            return Ok(Duration(0));
        }

        let invalid = || DurationError::Invalid(value.to_owned());
        let mut rest = value;
        let mut total: u64 = 0;
        let mut next_unit = 0usize;

        while !rest.is_empty() {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                return Err(invalid());
            }
            let amount: u64 = rest[..digits].parse().map_err(|_| invalid())?;
            rest = &rest[digits..];

            // "ms" must win over "m" when both could match.
            let position = UNITS[next_unit..]
                .iter()
                .enumerate()
                .filter(|(_, (suffix, _))| rest.starts_with(suffix))
                .max_by_key(|(_, (suffix, _))| suffix.len())
                .map(|(offset, _)| next_unit + offset)
                .ok_or_else(invalid)?;

            let (suffix, multiplier) = UNITS[position];
            rest = &rest[suffix.len()..];
            next_unit = position + 1;

            total = amount
                .checked_mul(multiplier)
                .and_then(|millis| total.checked_add(millis))
                .ok_or_else(|| DurationError::Overflow(value.to_owned()))?;
        }

        Ok(Duration(total))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut remaining = self.0;
        if remaining == 0 {
            return f.write_str("0s");
        }

        for &(suffix, multiplier) in UNITS {
            // Years and weeks are only used when they divide evenly; 90d reads
            // better than 12w6d.
            let exact_only = multiplier == YEAR || multiplier == WEEK;
            if exact_only && remaining % multiplier != 0 {
                continue;
            }
            let amount = remaining / multiplier;
            if amount > 0 {
                write!(f, "{amount}{suffix}")?;
                remaining -= amount * multiplier;
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_durations() {
        assert_eq!("1h30m".parse::<Duration>(), Ok(Duration(90 * MINUTE)));
        assert_eq!("15s".parse::<Duration>(), Ok(Duration::from_secs(15)));
        assert_eq!("1m500ms".parse::<Duration>(), Ok(Duration(MINUTE + 500)));
        assert_eq!("0".parse::<Duration>(), Ok(Duration(0)));
    }

    #[test]
    fn rejects_out_of_order_and_unknown_units() {
        assert!("30m1h".parse::<Duration>().is_err());
        assert!("10x".parse::<Duration>().is_err());
        assert!("1.5h".parse::<Duration>().is_err());
        assert_eq!("".parse::<Duration>(), Err(DurationError::Empty));
    }

    #[test]
    fn formats_like_the_parser_accepts() {
        assert_eq!(Duration::from_mins(1).to_string(), "1m");
        assert_eq!(Duration(90 * MINUTE).to_string(), "1h30m");
        assert_eq!(Duration(90 * DAY).to_string(), "90d");
        assert_eq!(Duration(2 * WEEK).to_string(), "2w");
        assert_eq!(Duration(0).to_string(), "0s");
        assert_eq!(Duration(1500).to_string(), "1s500ms");
    }
}
