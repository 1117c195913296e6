//! Live adapter for the `LlmClient` port using the Gemini `generateContent` API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Live LLM client that calls the Google Gemini API.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client authenticating with `api_key`; every request is
    /// bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client, api_key: api_key.into(), base_url: GEMINI_API_BASE.to_string() })
    }

    /// Points the client at a different API base (everything before `/models`).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<OutgoingPart<'a>>,
}

#[derive(Serialize)]
struct OutgoingPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<IncomingPart>,
}

#[derive(Deserialize)]
struct IncomingPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl LlmClient for GeminiClient {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        let url = self.endpoint(&request.model);
        let prompt = request.prompt.clone();
        let max_tokens = request.max_tokens;

        Box::pin(async move {
            let body = GenerateRequest {
                contents: vec![Content { role: "user", parts: vec![OutgoingPart { text: &prompt }] }],
                generation_config: GenerationConfig { max_output_tokens: max_tokens },
            };

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("Gemini API request failed: {e}").into()
                })?;

            let status = response.status();
            let response_text =
                response.text().await.map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("Failed to read Gemini API response: {e}").into()
                })?;

            if !status.is_success() {
                let msg = serde_json::from_str::<GeminiError>(&response_text)
                    .map(|e| e.error.message)
                    .unwrap_or(response_text);
                return Err(format!("Gemini API error ({}): {msg}", status.as_u16()).into());
            }

            let api_response: GenerateResponse = serde_json::from_str(&response_text).map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("Failed to parse Gemini API response: {e}").into()
                },
            )?;

            // Only the first candidate is used; a blocked prompt yields none.
            let text = api_response
                .candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content)
                .map(|content| {
                    content.parts.into_iter().filter_map(|part| part.text).collect::<String>()
                })
                .unwrap_or_default();
            let usage = api_response.usage_metadata;

            Ok(CompletionResponse {
                text,
                prompt_tokens: usage.as_ref().map_or(0, |u| u.prompt_token_count),
                completion_tokens: usage.as_ref().map_or(0, |u| u.candidates_token_count),
            })
        })
    }
}
