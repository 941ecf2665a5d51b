use std::fmt;

use chrono::{NaiveTime, Timelike};

use super::ScheduleError;

/// Wall-clock position in minutes since midnight.
///
/// Never wraps at midnight: a day that overruns keeps counting (`24:30`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

impl ClockTime {
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Parse a 24-hour `HH:mm` string.
    pub fn parse(input: &str) -> Result<Self, ScheduleError> {
        let trimmed = input.trim();
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map_err(|_| ScheduleError::InvalidTime(input.to_string()))?;
        Ok(Self(time.hour() * 60 + time.minute()))
    }

    pub fn advance(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(minutes))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_zero_padded() {
        let t = ClockTime::parse("08:05").unwrap();
        assert_eq!(t.minutes(), 485);
        assert_eq!(t.to_string(), "08:05");
        assert_eq!(ClockTime::parse("8:30").unwrap().to_string(), "08:30");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "8", "25:00", "12:60", "ab:cd", "12-30"] {
            assert_eq!(
                ClockTime::parse(bad),
                Err(ScheduleError::InvalidTime(bad.to_string())),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn keeps_counting_past_midnight() {
        let t = ClockTime::parse("23:50").unwrap().advance(40);
        assert_eq!(t.to_string(), "24:30");
    }
}
