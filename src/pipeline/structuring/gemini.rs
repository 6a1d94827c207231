use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::gemini_types::{GenerateContentRequest, GenerateContentResponse};
use super::types::{GenerationRequest, LlmClient, LlmResponse};
use super::LlmClientError;

/// Public Generative Language API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, LlmClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmClientError::HttpClient(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_start_matches("models/").to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, LlmClientError> {
        let body = GenerateContentRequest::new(
            &request.prompt,
            &request.response_schema,
            &request.params,
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmClientError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LlmClientError::Timeout(self.timeout_secs)
                } else {
                    LlmClientError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::ResponseParsing(e.to_string()))?;

        Ok(parsed.into_llm_response())
    }
}

/// Mock LLM client for testing. Returns a configurable response and counts
/// how often it was called.
pub struct MockLlmClient {
    outcome: Result<LlmResponse, String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockLlmClient {
    pub fn new(response: LlmResponse) -> Self {
        Self {
            outcome: Ok(response),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// A client that completes normally with the given text.
    pub fn with_text(text: &str) -> Self {
        Self::new(LlmResponse::text(text))
    }

    /// A client whose transport always fails.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, LlmClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(request.prompt.clone());
        }
        match self.outcome {
            Ok(ref response) => Ok(response.clone()),
            Err(ref message) => Err(LlmClientError::HttpClient(message.clone())),
        }
    }
}
