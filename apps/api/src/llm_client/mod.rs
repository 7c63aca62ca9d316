/// LLM Client — the single point of entry for all model API calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All model interactions MUST go through a `ModelProvider`.
///
/// The provider is chosen once at startup from `AI_PROVIDER` and held in
/// `AppState` as `Arc<dyn ModelProvider>`; handlers never branch on the
/// provider name.
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Models are intentionally hardcoded per provider to prevent drift.
pub const CLAUDE_MODEL: &str = "claude-sonnet-4-5";
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Model returned empty content")]
    EmptyContent,
}

/// The closed set of supported providers. Unknown names fail config parsing
/// at startup instead of surfacing per-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Claude,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" | "google gemini" => Ok(Self::Gemini),
            "claude" | "anthropic" | "anthropic claude" => Ok(Self::Claude),
            other => Err(format!(
                "Unknown AI provider '{other}' (expected 'gemini' or 'claude')"
            )),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Claude => write!(f, "claude"),
        }
    }
}

/// Capability trait for text generation. One object is built at startup and
/// injected; handlers stay provider-agnostic.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Provider and model label recorded alongside stored analyses.
    fn model_name(&self) -> &'static str;
}

/// Builds the configured provider.
pub fn build_provider(kind: ProviderKind, api_key: String) -> Arc<dyn ModelProvider> {
    match kind {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(api_key)),
        ProviderKind::Claude => Arc::new(ClaudeProvider::new(api_key)),
    }
}

fn http_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

/// Retry gate shared by both providers: 429 and 5xx are retried with
/// exponential backoff (1s, 2s, 4s), other statuses fail immediately.
async fn backoff(attempt: u32) {
    if attempt > 0 {
        let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
        warn!(
            "Model call attempt {} failed, retrying after {}ms...",
            attempt,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Claude (Anthropic Messages API)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

pub struct ClaudeProvider {
    client: Client,
    api_key: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(),
            api_key,
        }
    }
}

#[async_trait]
impl ModelProvider for ClaudeProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = AnthropicRequest {
            model: CLAUDE_MODEL,
            max_tokens: MAX_TOKENS,
            system: prompts::ANALYST_SYSTEM,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            backoff(attempt).await;

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Claude API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: AnthropicResponse = response.json().await?;

            debug!(
                "Claude call succeeded: input_tokens={}, output_tokens={}",
                parsed.usage.input_tokens, parsed.usage.output_tokens
            );

            let text = parsed
                .content
                .iter()
                .find(|b| b.block_type == "text")
                .and_then(|b| b.text.as_deref())
                .ok_or(LlmError::EmptyContent)?;

            return Ok(strip_report_fences(text).to_string());
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    fn model_name(&self) -> &'static str {
        CLAUDE_MODEL
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini (generateContent REST endpoint)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_URL}/{GEMINI_MODEL}:generateContent")
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            backoff(attempt).await;

            let response = self
                .client
                .post(self.endpoint())
                .query(&[("key", self.api_key.as_str())])
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: GeminiResponse = response.json().await?;

            let text = parsed
                .candidates
                .unwrap_or_default()
                .into_iter()
                .filter_map(|c| c.content)
                .filter_map(|c| c.parts)
                .flatten()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("");

            if text.trim().is_empty() {
                return Err(LlmError::EmptyContent);
            }

            debug!("Gemini call succeeded: {} chars", text.len());
            return Ok(strip_report_fences(&text).to_string());
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    fn model_name(&self) -> &'static str {
        GEMINI_MODEL
    }
}

/// Strips ```markdown ... ``` or ``` ... ``` code fences when a model wraps
/// the whole report in them.
fn strip_report_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```markdown") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_report_fences_with_markdown_tag() {
        let input = "```markdown\n## Overall Assessment\nGood.\n```";
        assert_eq!(strip_report_fences(input), "## Overall Assessment\nGood.");
    }

    #[test]
    fn test_strip_report_fences_without_tag() {
        let input = "```\n## Resume Score\n```";
        assert_eq!(strip_report_fences(input), "## Resume Score");
    }

    #[test]
    fn test_strip_report_fences_no_fences() {
        let input = "## Resume Score\nResume Score: 80/100";
        assert_eq!(strip_report_fences(input), input);
    }

    #[test]
    fn test_provider_kind_parses_known_names() {
        assert_eq!("gemini".parse::<ProviderKind>(), Ok(ProviderKind::Gemini));
        assert_eq!("Claude".parse::<ProviderKind>(), Ok(ProviderKind::Claude));
        assert_eq!(
            "Google Gemini".parse::<ProviderKind>(),
            Ok(ProviderKind::Gemini)
        );
        assert_eq!(
            "Anthropic Claude".parse::<ProviderKind>(),
            Ok(ProviderKind::Claude)
        );
    }

    #[test]
    fn test_provider_kind_rejects_unknown_names() {
        assert!("Custom Model".parse::<ProviderKind>().is_err());
        assert!("".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_display_round_trips() {
        for kind in [ProviderKind::Gemini, ProviderKind::Claude] {
            assert_eq!(kind.to_string().parse::<ProviderKind>(), Ok(kind));
        }
    }
}
