//! OpenRouter-compatible chat-completion client for report generation.
//!
//! Two operations share one transport: [`GenerationClient::generate_report`]
//! produces the full report from the collected document set, and
//! [`GenerationClient::revise_section`] rewrites a single page from user
//! feedback. Callers race both against their own timeout; this client does
//! not time requests out on its own.

pub mod prompt;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use reportforge_shared::{ReportForgeError, Result};

pub use prompt::{
    REPORT_SYSTEM_PROMPT, REVISION_SYSTEM_PROMPT, ReportPrompt, RevisionRequest, files_summary,
};

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("ReportForge/", env!("CARGO_PKG_VERSION"));

/// Attribution headers the service uses for rankings.
const REFERER: &str = "https://github.com/reportforge/reportforge";
const APP_TITLE: &str = "ReportForge";

/// Sampling settings for the full-report call.
const REPORT_TEMPERATURE: f32 = 0.6;
const REPORT_MAX_TOKENS: u32 = 3500;

/// Sampling settings for the targeted-revision call.
const REVISION_TEMPERATURE: f32 = 0.7;
const REVISION_MAX_TOKENS: u32 = 1500;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for the generation service.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Base URL of the chat-completion API (mock server in tests).
    pub base_url: String,
    /// Bearer credential for the service.
    pub api_key: String,
    /// Name of the env var the key came from, used in error hints.
    pub api_key_env: String,
    /// Model identifier sent with every request.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the generation service.
pub struct GenerationClient {
    client: Client,
    config: GeneratorConfig,
}

impl GenerationClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                ReportForgeError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Generate the full report from the assembled prompt.
    #[instrument(skip_all, fields(model = %self.config.model))]
    pub async fn generate_report(&self, prompt: &ReportPrompt) -> Result<String> {
        info!(max_pages = prompt.max_pages, "requesting report generation");
        self.chat(
            REPORT_SYSTEM_PROMPT,
            &prompt.user_message(),
            REPORT_TEMPERATURE,
            REPORT_MAX_TOKENS,
        )
        .await
    }

    /// Rewrite one section per the user's feedback, returning only the
    /// modified section.
    #[instrument(skip_all, fields(model = %self.config.model))]
    pub async fn revise_section(&self, request: &RevisionRequest) -> Result<String> {
        info!(
            section_chars = request.section.len(),
            "requesting section revision"
        );
        self.chat(
            REVISION_SYSTEM_PROMPT,
            &request.user_message(),
            REVISION_TEMPERATURE,
            REVISION_MAX_TOKENS,
        )
        .await
    }

    /// Issue one chat-completion call and extract the first choice's text.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReportForgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let detail = extract_error_detail(&raw);
            return Err(match status {
                StatusCode::UNAUTHORIZED => ReportForgeError::Unauthorized(format!(
                    "check the {} environment variable{}",
                    self.config.api_key_env,
                    detail.map(|d| format!(" ({d})")).unwrap_or_default()
                )),
                _ => ReportForgeError::Generation(format!(
                    "service returned HTTP {status}{}",
                    detail.map(|d| format!(": {d}")).unwrap_or_default()
                )),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ReportForgeError::Generation(format!("invalid response body: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                ReportForgeError::Generation("malformed response: no choices returned".into())
            })?;

        debug!(chars = content.len(), "generation response received");
        Ok(content)
    }
}

/// Pull the upstream `error.message` out of an error body, falling back to
/// the raw text when it is not the expected JSON shape.
fn extract_error_detail(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(detail) = parsed.error {
            return Some(detail.message);
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
