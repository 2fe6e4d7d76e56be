// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::{Prompt, PromptKind};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Raw model output. The text may be empty or malformed; validation is the
/// formatter's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
    pub usage: Usage,
}

#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<CompletionResult>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_interval,
            initial_interval: self.initial_interval,
            max_interval: self.max_interval,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Chat-completions client for the Mistral API (or any endpoint speaking the
/// same request shape).
pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    pr_model: String,
    temperature: f32,
    top_p: f32,
    random_seed: Option<u64>,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
    safe_prompt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    random_seed: Option<u64>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

enum Attempt {
    Done(CompletionResult),
    Retry(String),
    Fatal(Error),
}

impl CompletionClient {
    /// Fails with `MissingCredential` when no API key is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = SecretString::from(config.api_key()?.expose_secret().to_owned());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            pr_model: config.pr_model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            random_seed: config.random_seed,
            retry: RetryPolicy {
                max_attempts: config.max_attempts.max(1),
                initial_interval: Duration::from_millis(config.retry_initial_ms),
                max_interval: Duration::from_millis(config.retry_max_ms),
            },
        })
    }

    fn model_for(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::PrDescription | PromptKind::PrTitle => &self.pr_model,
            _ => &self.model,
        }
    }

    async fn attempt(&self, prompt: &Prompt) -> Attempt {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model_for(prompt.kind),
            messages: [Message {
                role: "user",
                content: &prompt.text,
            }],
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: prompt.max_output_tokens,
            stream: false,
            safe_prompt: false,
            random_seed: self.random_seed,
        };

        let response = match self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Attempt::Retry("request timed out".into()),
            Err(e) => return Attempt::Retry(e.to_string()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) if status.is_success() => {
                return Attempt::Fatal(Error::UnparsableResponse(e.to_string()));
            }
            Err(_) => String::new(),
        };

        if status.is_success() {
            return match parse_response(&body) {
                Ok(result) => Attempt::Done(result),
                Err(e) => Attempt::Fatal(e),
            };
        }

        classify_failure(status, &body)
    }
}

fn parse_response(body: &str) -> Result<CompletionResult> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| Error::UnparsableResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnparsableResponse("response has no choices".into()))?;

    Ok(CompletionResult {
        text: choice.message.content.unwrap_or_default().trim().to_string(),
        usage: parsed.usage.unwrap_or_default(),
    })
}

fn classify_failure(status: StatusCode, body: &str) -> Attempt {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Attempt::Fatal(Error::Auth {
            status: status.as_u16(),
        }),
        StatusCode::PAYLOAD_TOO_LARGE => Attempt::Fatal(Error::PayloadTooLarge),
        StatusCode::TOO_MANY_REQUESTS => Attempt::Retry(format!("HTTP {status}: {message}")),
        s if s.is_server_error() => Attempt::Retry(format!("HTTP {status}: {message}")),
        s => Attempt::Fatal(Error::Api {
            status: s.as_u16(),
            message,
        }),
    }
}

/// Best-effort extraction of an error message from an API error body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(m) = parsed.message {
            return m;
        }
        if let Some(d) = parsed.detail {
            return d.to_string();
        }
    }
    body.trim().chars().take(200).collect()
}

#[async_trait]
impl Completion for CompletionClient {
    async fn complete(&self, prompt: &Prompt) -> Result<CompletionResult> {
        let mut backoff = self.retry.backoff();
        let max_attempts = self.retry.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            debug!(kind = %prompt.kind, attempt, prompt_chars = prompt.text.len(), "requesting completion");

            match self.attempt(prompt).await {
                Attempt::Done(result) => {
                    debug!(
                        completion_tokens = result.usage.completion_tokens,
                        total_tokens = result.usage.total_tokens,
                        "completion received"
                    );
                    return Ok(result);
                }
                Attempt::Fatal(e) => return Err(e),
                Attempt::Retry(message) => {
                    warn!(attempt, max_attempts, error = %message, "transient completion failure");
                    last_error = message;

                    if attempt < max_attempts
                        && let Some(wait) = backoff.next_backoff()
                    {
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        Err(Error::TransientApi {
            attempts: max_attempts,
            message: last_error,
        })
    }
}
