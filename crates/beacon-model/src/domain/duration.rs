//! Go-style duration strings (`"10s"`, `"250ms"`), the format the Consul agent API
//! expects for check intervals and timeouts.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("missing numeric value in duration: {0}")]
    MissingValue(String),
    #[error("unknown duration unit in {0} (expected: ns|us|ms|s|m|h)")]
    UnknownUnit(String),
    #[error("duration out of range: {0}")]
    Overflow(String),
}

/// Render a duration using the coarsest unit that represents it exactly.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    const UNITS: [(u128, &str); 6] = [
        (3_600_000_000_000, "h"),
        (60_000_000_000, "m"),
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1_000, "us"),
        (1, "ns"),
    ];
    // "h" and "m" only when they divide evenly, otherwise seconds read better.
    for (scale, unit) in UNITS {
        if nanos % scale == 0 {
            return format!("{}{unit}", nanos / scale);
        }
    }
    format!("{nanos}ns")
}

/// Parse a single-unit duration such as `"5s"` or `"1500ms"`.
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (value, unit) = s.split_at(split);
    let value: u64 = value
        .parse()
        .map_err(|_| DurationParseError::MissingValue(s.to_string()))?;

    match unit {
        "ns" => Ok(Duration::from_nanos(value)),
        "us" | "µs" => Ok(Duration::from_micros(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "s" | "" if value == 0 => Ok(Duration::ZERO),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(s, value, 60),
        "h" => scaled_secs(s, value, 3600),
        _ => Err(DurationParseError::UnknownUnit(s.to_string())),
    }
}

fn scaled_secs(raw: &str, value: u64, factor: u64) -> Result<Duration, DurationParseError> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| DurationParseError::Overflow(raw.to_string()))
}

pub(crate) mod go_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_duration(&raw).map_err(D::Error::custom)
    }
}
