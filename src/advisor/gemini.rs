//! Hosted generative-language provider over HTTPS.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AdvisorConfig, InsightProvider};
use crate::error::AdvisorError;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Longest error body kept in [`AdvisorError::Status`].
const MAX_ERROR_BODY: usize = 256;

/// Generative-language API client.
pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    /// Create from config; the API key falls back to the environment.
    pub fn new(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tcptune/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.timeout)
            .build()?;

        Self::with_client(config, client)
    }

    /// Create from config with a prebuilt HTTP client.
    pub fn with_client(
        config: &AdvisorConfig,
        client: reqwest::Client,
    ) -> Result<Self, AdvisorError> {
        let api_key = resolve_api_key(config).ok_or(AdvisorError::MissingApiKey)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// API key from config, else the first set environment variable.
pub fn resolve_api_key(config: &AdvisorConfig) -> Option<String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            API_KEY_ENV_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
        })
}

#[async_trait]
impl InsightProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "requesting insights");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(AdvisorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: GenerateResponse = response.json().await?;
        response.text().ok_or(AdvisorError::EmptyResponse)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if non-blank.
    pub(crate) fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
