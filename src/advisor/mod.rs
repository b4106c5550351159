//! Optional advisory commentary from a hosted language model.
//!
//! The service is best-effort: its text is shown as-is, never parsed, and
//! every failure degrades to a fixed fallback message. Requests are bounded
//! by a timeout and can be cancelled, either explicitly or by a newer
//! request on the same [`InsightSession`].

mod gemini;
mod prompt;

pub use gemini::{resolve_api_key, GeminiProvider, API_KEY_ENV_VARS};
pub use prompt::build_prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{AdvisorError, Result};
use crate::tuning::TcpParams;
use crate::types::NetworkInput;

/// Shown when the service answers with no usable text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "Unable to generate insights at this time.";

/// Shown when the service cannot be reached or rejects the request.
pub const ERROR_FALLBACK: &str = "Error communicating with AI service. Please check your API key.";

/// Shown instead of commentary when `advisor.enabled` is off.
pub const DISABLED_NOTICE: &str = "Advisor disabled (set advisor.enabled = true in the config file).";

/// Advisory service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Allow advisory requests at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// API key. Falls back to `GEMINI_API_KEY`, then `API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Upper bound for one request.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Word limit requested in the prompt.
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Extra attempts after a transient failure.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_enabled() -> bool {
    true
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
fn default_max_words() -> usize {
    300
}
fn default_retries() -> u32 {
    1
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            max_words: default_max_words(),
            retries: default_retries(),
        }
    }
}

/// Source of free-text commentary for a prompt.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Generate commentary. Blank text should be reported as
    /// [`AdvisorError::EmptyResponse`].
    async fn generate(&self, prompt: &str) -> std::result::Result<String, AdvisorError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Applies the fallback, timeout and cancellation policy around a provider.
#[derive(Clone)]
pub struct Advisor {
    provider: Arc<dyn InsightProvider>,
    timeout: Duration,
    max_words: usize,
    retries: u32,
}

impl Advisor {
    /// Create an advisor that makes a single attempt per request.
    pub fn new(provider: Arc<dyn InsightProvider>, timeout: Duration, max_words: usize) -> Self {
        Self {
            provider,
            timeout,
            max_words,
            retries: 0,
        }
    }

    /// Allow `retries` extra attempts after a retryable failure.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Build an advisor backed by the hosted model in `config`.
    ///
    /// Fails with [`AdvisorError::Disabled`] when `config.enabled` is off.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        if !config.enabled {
            return Err(AdvisorError::Disabled.into());
        }
        let provider = GeminiProvider::new(config)?;
        Ok(Self::new(Arc::new(provider), config.timeout, config.max_words)
            .with_retries(config.retries))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Raw outcome of one bounded request.
    pub async fn request(
        &self,
        input: &NetworkInput,
        params: &TcpParams,
    ) -> std::result::Result<String, AdvisorError> {
        let prompt = build_prompt(input, params, self.max_words);
        match tokio::time::timeout(self.timeout, self.provider.generate(&prompt)).await {
            Ok(Ok(text)) if text.trim().is_empty() => Err(AdvisorError::EmptyResponse),
            Ok(result) => result,
            Err(_) => Err(AdvisorError::Timeout(self.timeout)),
        }
    }

    /// Bounded request with retries, abandoned with
    /// [`AdvisorError::Cancelled`] once `cancel` fires.
    pub async fn request_until(
        &self,
        input: &NetworkInput,
        params: &TcpParams,
        cancel: &CancellationToken,
    ) -> std::result::Result<String, AdvisorError> {
        let mut attempt = 0;
        loop {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(AdvisorError::Cancelled),
                outcome = self.request(input, params) => outcome,
            };

            match outcome {
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    debug!(
                        provider = self.provider.name(),
                        attempt,
                        error = %e,
                        "retrying insight request"
                    );
                }
                outcome => return outcome,
            }
        }
    }

    /// Commentary for a calculation, or `None` if `cancel` fired first.
    ///
    /// Failures are logged and replaced with a fallback message.
    pub async fn try_insights(
        &self,
        input: &NetworkInput,
        params: &TcpParams,
        cancel: &CancellationToken,
    ) -> Option<String> {
        Some(match self.request_until(input, params, cancel).await {
            Ok(text) => text,
            Err(AdvisorError::Cancelled) => {
                debug!(provider = self.provider.name(), "insight request cancelled");
                return None;
            }
            Err(AdvisorError::EmptyResponse) => {
                warn!(provider = self.provider.name(), "advisor returned no text");
                EMPTY_RESPONSE_FALLBACK.to_string()
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "advisor request failed");
                ERROR_FALLBACK.to_string()
            }
        })
    }

    /// Commentary for a calculation. Never fails.
    pub async fn insights(&self, input: &NetworkInput, params: &TcpParams) -> String {
        self.try_insights(input, params, &CancellationToken::new())
            .await
            .unwrap_or_else(|| ERROR_FALLBACK.to_string())
    }
}

/// At most one in-flight request; a new request supersedes the previous one.
pub struct InsightSession {
    advisor: Advisor,
    current: Option<CancellationToken>,
}

impl InsightSession {
    pub fn new(advisor: Advisor) -> Self {
        Self {
            advisor,
            current: None,
        }
    }

    /// Cancel any in-flight request and start a new one.
    ///
    /// The handle resolves to `None` if this request is itself superseded
    /// or the session is dropped.
    pub fn request(&mut self, input: NetworkInput, params: TcpParams) -> JoinHandle<Option<String>> {
        self.cancel();

        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let advisor = self.advisor.clone();
        tokio::spawn(async move { advisor.try_insights(&input, &params, &token).await })
    }

    /// Cancel the in-flight request, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    pub fn has_pending(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for InsightSession {
    fn drop(&mut self) {
        self.cancel();
    }
}
