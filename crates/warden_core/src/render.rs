//! Plain text rendering of answers and digests.

use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::time::Duration;

use crate::{DutyPeriod, format_time_spent};

/// Format of instants shown to people.
pub const TIME_FORMAT: &str = "%Y.%m.%d %H:%M";

fn time(instant: &DateTime<Utc>) -> String {
    instant.format(TIME_FORMAT).to_string()
}

/// `:phone: On duty:` block with the current person and everybody after them.
pub fn render_on_duty(current: Option<&DutyPeriod>, next: &[DutyPeriod]) -> String {
    let mut text = String::with_capacity(128);
    text.push_str(":phone: On duty:\n");

    let Some(current) = current else {
        text.push_str("Nobody\n");
        return text;
    };

    let _ = write!(text, "Now:\n\t{} till {}\nNext:\n", current.name(), time(current.end()));
    for period in next {
        let _ = writeln!(
            text,
            "\t{} from {} to {}",
            period.name(),
            time(period.start()),
            time(period.end())
        );
    }
    text
}

/// Cycles through the four `:rageN:` emoji.
#[derive(Debug, Clone, Copy)]
pub struct RageCounter(u8);

impl Default for RageCounter {
    fn default() -> Self {
        Self(1)
    }
}

impl RageCounter {
    /// Emoji for the next person without a record.
    pub fn next_emoji(&mut self) -> String {
        let emoji = format!(":rage{}:", self.0);
        self.0 = self.0 % 4 + 1;
        emoji
    }
}

/// One line per person: how much they logged, or that they logged nothing.
pub fn render_time_logs<'a>(entries: impl IntoIterator<Item = (&'a str, Duration)>) -> String {
    let mut rage = RageCounter::default();
    let mut text = String::new();
    for (name, time_spent) in entries {
        if time_spent.is_zero() {
            let _ = writeln!(text, "{} didn't log any time {}", name, rage.next_emoji());
        } else {
            let _ = writeln!(text, "{} logged only {}", name, format_time_spent(time_spent));
        }
    }
    text
}

/// Line shown when nobody is below the minimum.
pub fn render_nobody_below(minimum: Duration) -> String {
    format!(
        ":simple_smile: No users with logged time less than {}\n",
        format_time_spent(minimum)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_render_on_duty() {
        let current = DutyPeriod::new("ann", at(4, 9), at(4, 18));
        let next = vec![DutyPeriod::new("bob", at(4, 18), at(5, 9))];
        assert_eq!(
            render_on_duty(Some(&current), &next),
            ":phone: On duty:\nNow:\n\tann till 2024.03.04 18:00\nNext:\n\tbob from 2024.03.04 18:00 to 2024.03.05 09:00\n"
        );
    }

    #[test]
    fn test_render_on_duty_nobody() {
        assert_eq!(render_on_duty(None, &[]), ":phone: On duty:\nNobody\n");
    }

    #[test]
    fn test_rage_rotates() {
        let mut rage = RageCounter::default();
        let emojis: Vec<String> = (0..5).map(|_| rage.next_emoji()).collect();
        assert_eq!(emojis, vec![":rage1:", ":rage2:", ":rage3:", ":rage4:", ":rage1:"]);
    }

    #[test]
    fn test_render_time_logs() {
        let text = render_time_logs([
            ("Ann", Duration::from_secs(2 * 3600)),
            ("Bob", Duration::ZERO),
            ("Cid", Duration::ZERO),
        ]);
        assert_eq!(
            text,
            "Ann logged only 2h\nBob didn't log any time :rage1:\nCid didn't log any time :rage2:\n"
        );
    }
}
