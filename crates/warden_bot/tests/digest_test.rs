//! Daily digest tests against scripted providers and a recording messenger.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warden_aggregate::{DutyAggregator, RetryPolicy, TimelogAggregator};
use warden_bot::{DailyJob, DutyDigest, TimelogDigest};
use warden_core::{DutyPeriod, TeamMember, TimeWindow};
use warden_error::ProviderError;
use warden_interface::{DutyProvider, Messenger, TimelogProvider};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn hours(h: u64) -> Duration {
    Duration::from_secs(h * 3600)
}

fn member(name: &str, login: &str) -> TeamMember {
    TeamMember {
        name: name.to_string(),
        jira_login: login.to_string(),
        slack_login: login.to_string(),
    }
}

#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMessenger {
    fn sent_to(&self, channel: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == channel)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), ProviderError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_postponed_message(&self, _url: &str, _text: &str) -> Result<(), ProviderError> {
        Ok(())
    }
}

struct Roster {
    periods: Vec<DutyPeriod>,
    windows: Mutex<Vec<TimeWindow>>,
}

#[async_trait]
impl DutyProvider for Roster {
    async fn duty_periods(
        &self,
        _schedule_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<DutyPeriod>, ProviderError> {
        self.windows.lock().unwrap().push(window);
        Ok(self.periods.clone())
    }
}

struct Timesheets {
    logged: HashMap<String, Duration>,
    windows: Mutex<Vec<TimeWindow>>,
}

#[async_trait]
impl TimelogProvider for Timesheets {
    async fn time_spent(&self, user: &str, window: TimeWindow) -> Result<Duration, ProviderError> {
        self.windows.lock().unwrap().push(window);
        Ok(self.logged.get(user).copied().unwrap_or_default())
    }
}

fn duty_digest(periods: Vec<DutyPeriod>) -> (DutyDigest, Arc<Roster>, Arc<RecordingMessenger>) {
    let roster = Arc::new(Roster {
        periods,
        windows: Mutex::new(Vec::new()),
    });
    let messenger = Arc::new(RecordingMessenger::default());
    let digest = DutyDigest::new(
        DutyAggregator::new(roster.clone(), Duration::from_secs(5)),
        vec!["primary".to_string()],
        vec![member("Ann", "ann"), member("Bob", "bob")],
        "#ops",
        messenger.clone(),
    );
    (digest, roster, messenger)
}

fn timelog_digest(
    logged: &[(&str, Duration)],
) -> (TimelogDigest, Arc<Timesheets>, Arc<RecordingMessenger>) {
    let sheets = Arc::new(Timesheets {
        logged: logged.iter().map(|(u, d)| (u.to_string(), *d)).collect(),
        windows: Mutex::new(Vec::new()),
    });
    let messenger = Arc::new(RecordingMessenger::default());
    let policy = RetryPolicy::default()
        .with_initial_backoff_ms(2)
        .with_max_backoff_ms(10);
    let digest = TimelogDigest::new(
        TimelogAggregator::new(sheets.clone(), policy),
        vec![member("Ann Lee", "ann"), member("Bob", "bob"), member("Carl", "carl")],
        hours(6),
        "#ops",
        messenger.clone(),
    );
    (digest, sheets, messenger)
}

#[tokio::test]
async fn test_duty_digest_posts_roster_and_notices() {
    let (digest, roster, messenger) = duty_digest(vec![
        DutyPeriod::new("Bob", at(4, 18), at(5, 9)),
        DutyPeriod::new("Ann", at(4, 9), at(4, 18)),
        DutyPeriod::new("Carl", at(5, 9), at(5, 18)),
        DutyPeriod::new("Bob", at(6, 9), at(6, 18)),
    ]);

    digest.run(at(4, 10)).await.unwrap();

    let window = roster.windows.lock().unwrap()[0];
    assert_eq!(window.from, at(4, 0));
    assert_eq!(window.to, at(7, 3));

    let channel = messenger.sent_to("#ops");
    assert_eq!(channel.len(), 1);
    assert!(channel[0].starts_with(":phone: On duty:\nNow:\n\tAnn till 2024.03.04 18:00\nNext:\n"));
    assert!(channel[0].contains("\tCarl from 2024.03.05 09:00 to 2024.03.05 18:00\n"));

    assert_eq!(
        messenger.sent_to("@bob"),
        vec![
            "Hello, Bob! You are on duty from 2024.03.04 18:00 to 2024.03.05 09:00 and from 2024.03.06 09:00 to 2024.03.06 18:00. Enjoy!"
        ]
    );
    // Ann is on duty already and Carl is not in the team.
    assert!(messenger.sent_to("@ann").is_empty());
    assert_eq!(messenger.count(), 2);
}

#[tokio::test]
async fn test_duty_digest_silent_without_periods() {
    let (digest, _roster, messenger) = duty_digest(Vec::new());
    digest.run(at(4, 10)).await.unwrap();
    assert_eq!(messenger.count(), 0);
}

#[tokio::test]
async fn test_timelog_digest_reports_previous_working_day() {
    let (digest, sheets, messenger) =
        timelog_digest(&[("ann", hours(2)), ("bob", hours(8)), ("carl", Duration::ZERO)]);

    // Monday looks at Friday.
    digest.run(at(4, 10)).await.unwrap();
    assert!(sheets
        .windows
        .lock()
        .unwrap()
        .iter()
        .all(|w| w.from == at(1, 0) && w.to == at(2, 0)));

    assert_eq!(
        messenger.sent_to("#ops"),
        vec![":alarm_clock: Time logs:\n\t@ann logged only 2h\n\t@carl didn't log any time :rage1:\n"]
    );
    assert_eq!(
        messenger.sent_to("@ann"),
        vec!["Hi, Ann! You logged only 2h for yesterday. Could you please log at least 6 hours?"]
    );
    assert_eq!(
        messenger.sent_to("@carl"),
        vec!["Hi, Carl! You didn't log any time for yesterday. Could you please log at least 6 hours?"]
    );
    assert!(messenger.sent_to("@bob").is_empty());
}

#[tokio::test]
async fn test_timelog_digest_silent_when_everybody_logged() {
    let (digest, _sheets, messenger) =
        timelog_digest(&[("ann", hours(7)), ("bob", hours(8)), ("carl", hours(6))]);
    digest.run(at(5, 10)).await.unwrap();
    assert_eq!(messenger.count(), 0);
}
