//! Core `Assistant` trait and the Gemini REST implementation.
//!
//! `GeminiClient` calls the `generateContent` endpoint of the Gemini v1beta
//! API.  All connection details come from [`AssistantConfig`]; nothing is
//! hardcoded.  The credential travels in the `x-goog-api-key` header so it
//! never appears in a URL (and therefore never in an error string).

use async_trait::async_trait;
use thiserror::Error;

use crate::assistant::credential::Credential;
use crate::assistant::prompt::{compose_request, SYSTEM_INSTRUCTION};
use crate::config::AssistantConfig;

// ---------------------------------------------------------------------------
// AssistantError
// ---------------------------------------------------------------------------

/// Errors that can occur during an assistant call.
///
/// Remote failures are classified by substring of the error body with the
/// HTTP status as a secondary signal; anything unrecognized lands in
/// [`Unclassified`](Self::Unclassified).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// No credential was supplied — no network call is attempted.
    #[error("API key is missing")]
    MissingCredential,

    /// The service rejected the supplied credential.
    #[error("API key was rejected: {0}")]
    InvalidCredential(String),

    /// The configured model does not exist.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The account's quota is exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The request did not complete within the configured timeout.
    #[error("assistant request timed out")]
    Timeout,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse assistant response: {0}")]
    Parse(String),

    /// The model returned a response with no usable text content.
    #[error("assistant returned an empty response")]
    EmptyResponse,

    /// A remote failure that matched no known pattern.
    #[error("unexpected assistant failure: {0}")]
    Unclassified(String),
}

impl From<reqwest::Error> for AssistantError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AssistantError::Timeout
        } else {
            AssistantError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Assistant trait
// ---------------------------------------------------------------------------

/// Async trait for the hosted study assistant.
///
/// Implementors must be `Send + Sync` so they can be shared with the
/// background worker as `Arc<dyn Assistant>`.
///
/// # Arguments
/// * `instruction` – The task text (fixed instruction or literal question).
/// * `context`     – The full subject material, sent verbatim.
/// * `credential`  – The API key; an empty one fails before any network call.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn ask(
        &self,
        instruction: &str,
        context: &str,
        credential: &Credential,
    ) -> Result<String, AssistantError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls the Gemini `models/{model}:generateContent` REST endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    config: AssistantConfig,
}

impl GeminiClient {
    /// Build a `GeminiClient` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &AssistantConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Assistant for GeminiClient {
    async fn ask(
        &self,
        instruction: &str,
        context: &str,
        credential: &Credential,
    ) -> Result<String, AssistantError> {
        if credential.is_empty() {
            return Err(AssistantError::MissingCredential);
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let body = serde_json::json!({
            "system_instruction": {
                "parts": [ { "text": SYSTEM_INSTRUCTION } ]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [ { "text": compose_request(instruction, context) } ]
                }
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.reveal())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body_text));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AssistantError::Parse(e.to_string()))?;

        let answer = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(AssistantError::EmptyResponse)?
            .trim()
            .to_string();

        if answer.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }

        Ok(answer)
    }
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

/// Classify a non-success HTTP response into an [`AssistantError`].
///
/// The Gemini error body is `{"error": {"message", "status", ...}}`; the
/// message is matched first, the HTTP status code second.
fn classify_failure(status: reqwest::StatusCode, body: &str) -> AssistantError {
    let detail = error_message(body).unwrap_or_else(|| body.trim().to_string());
    let lowered = detail.to_lowercase();

    if detail.contains("API key not valid")
        || status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
    {
        AssistantError::InvalidCredential(detail)
    } else if detail.contains("NotFound") || status == reqwest::StatusCode::NOT_FOUND {
        AssistantError::ModelNotFound(detail)
    } else if lowered.contains("quota") || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        AssistantError::QuotaExceeded(detail)
    } else if lowered.contains("timeout") || status == reqwest::StatusCode::GATEWAY_TIMEOUT {
        AssistantError::Timeout
    } else {
        AssistantError::Unclassified(detail)
    }
}

/// Pull `error.message` (with `error.status` appended when present) out of a
/// Gemini error body, if the body is JSON at all.
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = json["error"]["message"].as_str()?;

    match json["error"]["status"].as_str() {
        Some(status) => Some(format!("{status}: {message}")),
        None => Some(message.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn make_config() -> AssistantConfig {
        AssistantConfig {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-1.5-pro".into(),
            timeout_secs: 5,
        }
    }

    /// An empty credential must fail before any network traffic.
    #[tokio::test]
    async fn empty_credential_fails_without_network() {
        // Unroutable base URL: if a request were attempted it would error
        // with Request/Timeout, not MissingCredential.
        let config = AssistantConfig {
            base_url: "http://192.0.2.1".into(),
            ..make_config()
        };
        let client = GeminiClient::from_config(&config);

        let err = client
            .ask("Sammanfatta.", "lite material", &Credential::default())
            .await
            .unwrap_err();

        assert_eq!(err, AssistantError::MissingCredential);
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _client = GeminiClient::from_config(&make_config());
    }

    /// Verify that `GeminiClient` is object-safe (usable as `dyn Assistant`).
    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn Assistant> = Box::new(GeminiClient::from_config(&make_config()));
        drop(client);
    }

    // -----------------------------------------------------------------------
    // Failure classification
    // -----------------------------------------------------------------------

    #[test]
    fn rejected_key_classifies_as_invalid_credential() {
        let body = r#"{"error":{"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, AssistantError::InvalidCredential(_)));
    }

    #[test]
    fn missing_model_classifies_as_not_found() {
        let body = r#"{"error":{"message":"models/gemini-nope is not found","status":"NotFound"}}"#;
        let err = classify_failure(StatusCode::NOT_FOUND, body);
        assert!(matches!(err, AssistantError::ModelNotFound(_)));
    }

    #[test]
    fn quota_classifies_by_substring_and_status() {
        let body = r#"{"error":{"message":"Quota exceeded for requests","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, AssistantError::QuotaExceeded(_)));
    }

    #[test]
    fn remote_timeout_classifies_as_timeout() {
        let body = r#"{"error":{"message":"Request timeout reached","status":"DEADLINE_EXCEEDED"}}"#;
        let err = classify_failure(StatusCode::GATEWAY_TIMEOUT, body);
        assert_eq!(err, AssistantError::Timeout);
    }

    #[test]
    fn unknown_failures_land_in_unclassified() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "total haveri");
        assert_eq!(err, AssistantError::Unclassified("total haveri".into()));
    }

    #[test]
    fn error_message_prefers_the_json_body() {
        let body = r#"{"error":{"message":"boom","status":"INTERNAL"}}"#;
        assert_eq!(error_message(body), Some("INTERNAL: boom".into()));
        assert_eq!(error_message("not json"), None);
    }
}
