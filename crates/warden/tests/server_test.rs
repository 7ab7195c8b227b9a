//! HTTP endpoint tests driving the assembled app with stub clients.

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use warden::{App, WardenConfig};
use warden_core::{DutyPeriod, TimeWindow};
use warden_error::ProviderError;
use warden_interface::{DutyProvider, Messenger, TimelogProvider};

const CONFIG: &str = r##"
[slack]
token = "xoxb-test"
channel = "#ops"

[jira]
token = "jira"
base_url = "http://jira.invalid"

[opsgenie]
token = "genie"

[duty_command]
enable = true
name = "duty"
token = "duty-secret"
schedule_ids = ["primary"]
daily_message_time = "09:00"

[timelogs_command]
enable = true
name = "timelogs"
token = "timelogs-secret"
minimum_time_logged_mins = 360
daily_message_time = "10:00"

[[timelogs_command.team]]
name = "Ann"
jira_login = "ann"
slack_login = "ann"
"##;

struct EmptyRoster;

#[async_trait]
impl DutyProvider for EmptyRoster {
    async fn duty_periods(
        &self,
        _schedule_id: &str,
        _window: TimeWindow,
    ) -> Result<Vec<DutyPeriod>, ProviderError> {
        Ok(Vec::new())
    }
}

struct FullDays;

#[async_trait]
impl TimelogProvider for FullDays {
    async fn time_spent(&self, _user: &str, _window: TimeWindow) -> Result<Duration, ProviderError> {
        Ok(Duration::from_secs(8 * 3600))
    }
}

#[derive(Default)]
struct RecordingMessenger {
    postponed: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, _channel: &str, _text: &str) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn send_postponed_message(&self, url: &str, text: &str) -> Result<(), ProviderError> {
        self.postponed
            .lock()
            .unwrap()
            .push((url.to_string(), text.to_string()));
        Ok(())
    }
}

fn app() -> (App, Arc<RecordingMessenger>) {
    let config = WardenConfig::parse(CONFIG).unwrap();
    config.validate().unwrap();
    let messenger = Arc::new(RecordingMessenger::default());
    let app = App::with_clients(
        &config,
        Arc::new(EmptyRoster),
        Arc::new(FullDays),
        messenger.clone(),
    )
    .unwrap();
    (app, messenger)
}

async fn post_command(app: &App, form: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn wait_for_delivery(messenger: &RecordingMessenger) -> Vec<(String, String)> {
    for _ in 0..200 {
        let delivered = messenger.postponed.lock().unwrap().clone();
        if !delivered.is_empty() {
            return delivered;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no postponed delivery");
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_postponed_then_cached() {
    let (app, messenger) = app();
    let form = "command=%2Fduty&text=today&token=duty-secret&response_url=http%3A%2F%2Fhook";

    let (status, body) = post_command(&app, form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");

    let delivered = wait_for_delivery(&messenger).await;
    assert_eq!(
        delivered,
        vec![("http://hook".to_string(), ":phone: On duty:\nNobody\n".to_string())]
    );

    let (_, body) = post_command(&app, form).await;
    assert_eq!(body, ":phone: On duty:\nNobody\n");
}

#[tokio::test]
async fn test_rejected_commands_render_error() {
    let (app, messenger) = app();

    let (status, body) = post_command(&app, "command=%2Fduty&token=wrong").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Error: \"validation failed: invalid token\"");

    let (_, body) = post_command(&app, "command=%2Foncall&token=duty-secret").await;
    assert_eq!(body, "Error: \"unknown command \\\"oncall\\\"\"");

    let (_, body) = post_command(&app, "text=today").await;
    assert_eq!(body, "Error: \"empty command\"");

    assert!(messenger.postponed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_disabled_commands_not_registered() {
    let config = WardenConfig::parse(&CONFIG.replace(
        "enable = true\nname = \"timelogs\"",
        "enable = false\nname = \"timelogs\"",
    ))
    .unwrap();
    let app = App::with_clients(
        &config,
        Arc::new(EmptyRoster),
        Arc::new(FullDays),
        Arc::new(RecordingMessenger::default()),
    )
    .unwrap();
    assert_eq!(app.manager().commands(), vec!["duty".to_string()]);
}
