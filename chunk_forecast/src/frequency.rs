//! Forecast step sizes and future timestamp layout

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed time step between consecutive forecast timestamps.
///
/// Parsed from pandas-style aliases such as `"1min"`, `"5min"`, `"T"`,
/// `"30s"`, `"1h"`, `"D"` or `"1w"`. Serialized back as its alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency {
    count: u32,
    unit: FrequencyUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FrequencyUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
}

impl FrequencyUnit {
    fn alias(self) -> &'static str {
        match self {
            FrequencyUnit::Millisecond => "ms",
            FrequencyUnit::Second => "s",
            FrequencyUnit::Minute => "min",
            FrequencyUnit::Hour => "h",
            FrequencyUnit::Day => "d",
            FrequencyUnit::Week => "w",
        }
    }

    fn duration(self, count: i64) -> Duration {
        match self {
            FrequencyUnit::Millisecond => Duration::milliseconds(count),
            FrequencyUnit::Second => Duration::seconds(count),
            FrequencyUnit::Minute => Duration::minutes(count),
            FrequencyUnit::Hour => Duration::hours(count),
            FrequencyUnit::Day => Duration::days(count),
            FrequencyUnit::Week => Duration::weeks(count),
        }
    }
}

impl Frequency {
    /// `count` whole minutes
    pub fn minutes(count: u32) -> Result<Self> {
        Self::new(count, FrequencyUnit::Minute)
    }

    /// `count` whole seconds
    pub fn seconds(count: u32) -> Result<Self> {
        Self::new(count, FrequencyUnit::Second)
    }

    /// `count` whole hours
    pub fn hours(count: u32) -> Result<Self> {
        Self::new(count, FrequencyUnit::Hour)
    }

    /// `count` whole days
    pub fn days(count: u32) -> Result<Self> {
        Self::new(count, FrequencyUnit::Day)
    }

    fn new(count: u32, unit: FrequencyUnit) -> Result<Self> {
        if count == 0 {
            return Err(ForecastError::InvalidParameter(
                "Frequency multiplier must be positive".to_string(),
            ));
        }
        Ok(Self { count, unit })
    }

    /// Length of one step
    pub fn step(&self) -> Duration {
        self.unit.duration(i64::from(self.count))
    }

    /// Exactly `horizon` timestamps spaced by this frequency, starting one
    /// step after `last` (history excluded).
    ///
    /// Fails with `InvalidParameter` when the horizon runs past the range
    /// `DateTime<Utc>` can represent.
    pub fn future_timestamps(
        &self,
        last: DateTime<Utc>,
        horizon: usize,
    ) -> Result<Vec<DateTime<Utc>>> {
        let step = self.step();
        let mut timestamps = Vec::with_capacity(horizon);
        let mut current = last;

        for _ in 0..horizon {
            current = current.checked_add_signed(step).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "{} steps of {} after {} overflow the timestamp range",
                    horizon, self, last
                ))
            })?;
            timestamps.push(current);
        }

        Ok(timestamps)
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self {
            count: 1,
            unit: FrequencyUnit::Minute,
        }
    }
}

impl FromStr for Frequency {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);

        let count = if digits.is_empty() {
            1
        } else {
            digits.parse::<u32>().map_err(|e| {
                ForecastError::InvalidParameter(format!("Invalid frequency '{}': {}", s, e))
            })?
        };

        let unit = match unit {
            "ms" | "L" => FrequencyUnit::Millisecond,
            "s" | "S" | "sec" | "second" => FrequencyUnit::Second,
            "min" | "T" | "m" | "minute" => FrequencyUnit::Minute,
            "h" | "H" | "hour" | "hourly" => FrequencyUnit::Hour,
            "d" | "D" | "day" | "daily" => FrequencyUnit::Day,
            "w" | "W" | "week" | "weekly" => FrequencyUnit::Week,
            _ => {
                return Err(ForecastError::InvalidParameter(format!(
                    "Unsupported frequency: {}",
                    s
                )))
            }
        };

        Self::new(count, unit)
    }
}

impl TryFrom<String> for Frequency {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.alias())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("1min", Duration::minutes(1))]
    #[case("min", Duration::minutes(1))]
    #[case("5min", Duration::minutes(5))]
    #[case("T", Duration::minutes(1))]
    #[case("30s", Duration::seconds(30))]
    #[case("250ms", Duration::milliseconds(250))]
    #[case("1h", Duration::hours(1))]
    #[case("D", Duration::days(1))]
    #[case("daily", Duration::days(1))]
    #[case("2w", Duration::weeks(2))]
    fn test_parse_aliases(#[case] alias: &str, #[case] expected: Duration) {
        let frequency: Frequency = alias.parse().unwrap();
        assert_eq!(frequency.step(), expected);
    }

    #[rstest]
    #[case("0min")]
    #[case("1fortnight")]
    #[case("")]
    #[case("-1min")]
    fn test_parse_rejects(#[case] alias: &str) {
        assert!(alias.parse::<Frequency>().is_err());
    }

    #[test]
    fn test_default_is_one_minute() {
        assert_eq!(Frequency::default().step(), Duration::minutes(1));
        assert_eq!(Frequency::default().to_string(), "1min");
    }

    #[test]
    fn test_future_timestamps_exclude_history() {
        let last = Utc.with_ymd_and_hms(2021, 1, 4, 0, 9, 0).unwrap();
        let future = Frequency::minutes(1).unwrap().future_timestamps(last, 3).unwrap();

        assert_eq!(
            future,
            vec![
                Utc.with_ymd_and_hms(2021, 1, 4, 0, 10, 0).unwrap(),
                Utc.with_ymd_and_hms(2021, 1, 4, 0, 11, 0).unwrap(),
                Utc.with_ymd_and_hms(2021, 1, 4, 0, 12, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_future_timestamps_overflow_is_an_error() {
        let last = Utc.with_ymd_and_hms(2021, 1, 4, 0, 9, 0).unwrap();
        let frequency: Frequency = "100000000d".parse().unwrap();

        assert!(matches!(
            frequency.future_timestamps(last, 1),
            Err(ForecastError::InvalidParameter(_))
        ));
        // the first step fits, the second runs past the representable range
        let frequency: Frequency = "50000000d".parse().unwrap();
        assert!(frequency.future_timestamps(last, 1).is_ok());
        assert!(matches!(
            frequency.future_timestamps(last, 2),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_serde_uses_alias() {
        let frequency: Frequency = serde_json::from_str("\"15min\"").unwrap();
        assert_eq!(frequency.step(), Duration::minutes(15));
        assert_eq!(serde_json::to_string(&frequency).unwrap(), "\"15min\"");
    }
}
