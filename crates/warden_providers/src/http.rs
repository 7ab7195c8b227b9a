//! Request helpers shared by the clients.

use serde::de::DeserializeOwned;
use warden_error::{ProviderError, ProviderErrorKind};

/// Longest response body kept in an error.
const MAX_ERROR_BODY: usize = 512;

/// Send `request` and return the body of a successful response.
pub(crate) async fn send(request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
    let response = request.send().await.map_err(|e| {
        tracing::error!("Request failed: {}", e);
        ProviderError::new(ProviderErrorKind::Http(e.to_string()))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        tracing::error!("Failed to read response body: {}", e);
        ProviderError::new(ProviderErrorKind::Http(e.to_string()))
    })?;

    if !status.is_success() {
        tracing::error!(status = status.as_u16(), "Upstream returned error");
        return Err(ProviderError::new(ProviderErrorKind::Status {
            status: status.as_u16(),
            body: truncate(&body),
        }));
    }

    tracing::trace!(bytes = body.len(), "Response received");
    Ok(body)
}

/// Decode a JSON body.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to parse response: {}", e);
        ProviderError::new(ProviderErrorKind::Decode(format!(
            "{} in {:?}",
            e,
            truncate(body)
        )))
    })
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_bodies() {
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        let cut = truncate(&long);
        assert_eq!(cut.len(), MAX_ERROR_BODY + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_decode_error_kind() {
        let err = decode::<Vec<u32>>("{oops").unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::Decode(_)));
    }
}
