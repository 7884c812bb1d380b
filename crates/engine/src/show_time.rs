//! Show times in 24-hour `HH:MM` notation.

use std::{fmt, str::FromStr};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::EngineError;

const FORMAT: &str = "%H:%M";

/// Time of day a movie starts.
///
/// Only the strict `HH:MM` form is accepted (`09:05`, `18:30`); single digit
/// hours and out-of-range values such as `25:00` are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShowTime(NaiveTime);

impl ShowTime {
    #[must_use]
    pub const fn time(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for ShowTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for ShowTime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || {
            EngineError::InvalidFormat(format!(
                "show time must be HH:MM in 24-hour format, got '{trimmed}'"
            ))
        };

        let bytes = trimmed.as_bytes();
        let shaped = bytes.len() == 5
            && bytes[2] == b':'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 2 || b.is_ascii_digit());
        if !shaped {
            return Err(invalid());
        }

        NaiveTime::parse_from_str(trimmed, FORMAT)
            .map(ShowTime)
            .map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        let time: ShowTime = "18:30".parse().unwrap();
        assert_eq!(time.to_string(), "18:30");
        assert_eq!("00:00".parse::<ShowTime>().unwrap().to_string(), "00:00");
        assert_eq!(" 23:59 ".parse::<ShowTime>().unwrap().to_string(), "23:59");
    }

    #[test]
    fn rejects_out_of_range_and_malformed_times() {
        for raw in ["25:00", "24:00", "12:60", "9:30", "0930", "12:3", "ab:cd", "", "12:30:00"] {
            let err = raw.parse::<ShowTime>().unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidFormat(_)),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn orders_chronologically() {
        let early: ShowTime = "09:15".parse().unwrap();
        let late: ShowTime = "21:00".parse().unwrap();
        assert!(early < late);
    }
}
