//! Slack messenger.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use warden_error::{ProviderError, ProviderErrorKind};
use warden_interface::Messenger;

use crate::http::{decode, send};

/// Default Web API endpoint.
pub const SLACK_API_URL: &str = "https://slack.com/api";

/// Message body for `chat.postMessage` and response URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackPayload {
    /// Target channel or user, unused for response URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Message text
    pub text: String,
    /// Post as the authenticated user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_user: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack client authenticated with a bot token.
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl SlackClient {
    /// Create a client against `api_url`, [`SLACK_API_URL`] in production.
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl Messenger for SlackClient {
    #[tracing::instrument(skip(self, text), fields(length = text.len()))]
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), ProviderError> {
        let payload = SlackPayload {
            channel: Some(channel.to_string()),
            text: text.to_string(),
            as_user: Some(true),
        };

        let request = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&payload);

        let body = send(request).await?;
        let response: ApiResponse = decode(&body)?;
        if !response.ok {
            let error = response.error.unwrap_or_else(|| "unknown error".to_string());
            tracing::error!(error = %error, "Slack rejected message");
            return Err(ProviderError::new(ProviderErrorKind::Status {
                status: 200,
                body: error,
            }));
        }

        tracing::debug!("Message posted");
        Ok(())
    }

    #[tracing::instrument(skip(self, text), fields(length = text.len()))]
    async fn send_postponed_message(&self, response_url: &str, text: &str) -> Result<(), ProviderError> {
        if response_url.is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::InvalidRequest(
                "empty response URL".to_string(),
            )));
        }

        let payload = SlackPayload {
            text: text.to_string(),
            ..Default::default()
        };
        send(self.client.post(response_url).json(&payload)).await?;

        tracing::debug!("Postponed answer delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_url_payload_has_only_text() {
        let payload = SlackPayload {
            text: "hi".into(),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"text":"hi"}"#);
    }
}
