//! Gemini `generateContent` client

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::retry::{ResilientClient, RetryPolicy};
use super::transport::{HttpRequest, HttpTransport, Transport};
use super::{GeminiError, GenerateContentRequest, GenerateContentResponse};
use crate::config::Config;

/// Stateless generative client - each call carries its full context
///
/// The remote API keeps nothing between calls, so multi-turn callers resend
/// the whole conversation every time.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse, GeminiError>;
}

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    caller: ResilientClient,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &Config) -> Result<Self, GeminiError> {
        debug!(model = %config.llm.model, "from_config: called");
        let api_key = config
            .llm
            .get_api_key()
            .map_err(|_| GeminiError::MissingApiKey(config.llm.api_key_env.clone()))?;

        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        let caller = ResilientClient::new(transport, RetryPolicy::from(&config.retry));

        Ok(Self::new(&config.llm.model, api_key, &config.llm.base_url, caller))
    }

    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        caller: ResilientClient,
    ) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            caller,
        }
    }

    /// `{base}/v1beta/models/{model}:generateContent`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_http_request(&self, request: &GenerateContentRequest) -> Result<HttpRequest, GeminiError> {
        let body = serde_json::to_value(request)?;
        Ok(HttpRequest::post_json(self.endpoint(), body).header("x-goog-api-key", self.api_key.clone()))
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse, GeminiError> {
        debug!(model = %self.model, content_count = %request.contents.len(), "generate: called");
        let http_request = self.build_http_request(&request)?;
        let response = self.caller.send(&http_request).await?;

        serde_json::from_str(&response.body).map_err(|e| {
            debug!(error = %e, "generate: success body is not JSON");
            GeminiError::InvalidResponse(format!("response body is not valid JSON: {}", e))
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::retry::mock::{RecordingPause, ScriptedTransport, Step};
    use crate::gemini::{Part, Role};
    use std::time::Duration;

    fn client_with(transport: Arc<ScriptedTransport>) -> GeminiClient {
        let policy = RetryPolicy::linear(2, Duration::from_millis(50), Duration::from_millis(10));
        let caller = ResilientClient::new(transport, policy).with_pause(Arc::new(RecordingPause::default()));
        GeminiClient::new("gemini-1.5-flash-latest", "test-key", "https://example.test/", caller)
    }

    #[test]
    fn test_endpoint_templated_with_model() {
        let client = client_with(Arc::new(ScriptedTransport::always(Step::Respond(200, "{}".to_string()))));
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_sends_credential_and_body() {
        let transport = Arc::new(ScriptedTransport::always(Step::Respond(
            200,
            r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#.to_string(),
        )));
        let client = client_with(transport.clone());

        let request = GenerateContentRequest::conversation(vec![(Role::User, "hi".to_string())]);
        let response = client.generate(request).await.unwrap();

        assert_eq!(response.first_text(), Some("hello"));
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert!(
            sent[0]
                .headers
                .contains(&("x-goog-api-key".to_string(), "test-key".to_string()))
        );
        assert_eq!(sent[0].body["contents"][0]["parts"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn test_generate_rejects_non_json_success_body() {
        let transport = Arc::new(ScriptedTransport::always(Step::Respond(200, "not json".to_string())));
        let client = client_with(transport.clone());

        let request = GenerateContentRequest::single_turn(vec![Part::text("x")]);
        let err = client.generate(request).await.unwrap_err();

        assert!(matches!(err, GeminiError::InvalidResponse(_)));
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "CAMPUSSYNC_CLIENT_TEST_KEY_NEVER_SET".to_string();

        match GeminiClient::from_config(&config) {
            Err(GeminiError::MissingApiKey(var)) => assert_eq!(var, "CAMPUSSYNC_CLIENT_TEST_KEY_NEVER_SET"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected missing key error"),
        }
    }
}
