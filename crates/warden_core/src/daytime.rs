//! Wall-clock time of day (`HH:MM`) used for daily messages.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use warden_error::ConfigError;

/// Hour and minute of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{:02}:{:02}", hour, minute)]
pub struct DayTime {
    /// 0..=23
    pub hour: u32,
    /// 0..=59
    pub minute: u32,
}

impl DayTime {
    /// Cron expression firing every day at this time (`sec min hour dom mon dow year`).
    pub fn cron_expression(&self) -> String {
        format!("0 {} {} * * * *", self.minute, self.hour)
    }
}

impl FromStr for DayTime {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = value
            .split_once(':')
            .filter(|(h, m)| h.len() == 2 && m.len() == 2)
            .ok_or_else(|| ConfigError::new(format!("time format error: {:?}", value)))?;

        let hour: u32 = hour
            .parse()
            .map_err(|_| ConfigError::new(format!("time format error: {:?}", value)))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| ConfigError::new(format!("time format error: {:?}", value)))?;

        if hour > 23 || minute > 59 {
            return Err(ConfigError::new(format!("time format error: {:?}", value)));
        }
        Ok(Self { hour, minute })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day_time() {
        let time: DayTime = "09:05".parse().unwrap();
        assert_eq!(time, DayTime { hour: 9, minute: 5 });
        assert_eq!(time.to_string(), "09:05");
        assert_eq!(time.cron_expression(), "0 5 9 * * * *");
    }

    #[test]
    fn test_reject_bad_day_time() {
        for bad in ["9:05", "24:00", "12:60", "ab:cd", "", "12:345"] {
            assert!(bad.parse::<DayTime>().is_err(), "{bad} should be rejected");
        }
    }
}
