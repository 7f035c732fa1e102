//! Generation provider client
//!
//! Defines the [`GenerationProvider`] seam and its OpenAI-compatible
//! chat-completions implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{GatewayError, Result};

/// Upper bound on generated tokens per request.
pub const MAX_TOKENS: u32 = 500;
/// Sampling temperature.
pub const TEMPERATURE: f32 = 0.8;

const SYSTEM_INSTRUCTION: &str = "You are a friendly, simple teacher creating short, \
child-friendly educational text for ages 6-12. Output ONLY a JSON object with the fields: \
title (short string), text (one short intro paragraph), explanation (1-3 short paragraphs), \
funFacts (an array of 2-6 short bullet strings), links (an array of objects with fields \
{title, url, source}) and relatedObjects (an array of 1-3 short related object names as \
simple nouns). Links should be to trustworthy educational resources (Khan Academy, OpenStax, \
OER Commons, PBS, National Geographic, Wikimedia, YouTube educational videos, etc.) when \
available. If you are not certain of a valid URL, return an empty array for links. \
Keep language simple and positive.";

// == Prompt ==
/// The instruction pair sent to the provider for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Builds the prompt for an object seen from a subject's perspective.
    pub fn for_request(object_name: &str, subject: &str) -> Self {
        let user = format!(
            "Create educational content about the object named \"{object_name}\" from the \
             perspective of the subject \"{subject}\". Make the text engaging for children \
             (6-12), include one clear, simple explanation and 2-5 fun activity/fact bullets. \
             Also include a field \"relatedObjects\" listing 1 to 3 short related object names \
             (single words or short phrases). If you cannot think of related objects, return \
             an empty array for that field. If possible return up to 4 trustworthy resource \
             links (title and url). Respond with JSON only."
        );

        Self {
            system: SYSTEM_INSTRUCTION.to_string(),
            user,
        }
    }
}

// == Provider Trait ==
/// A text-generation backend.
///
/// Implementations return the raw generated text; parsing is the caller's job.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String>;
}

// == Wire Types ==
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    n: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletion {
    /// First choice's message content, else its legacy `text`, else "".
    fn into_text(self) -> String {
        let Some(choice) = self.choices.into_iter().next() else {
            return String::new();
        };

        choice
            .message
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
            .or(choice.text)
            .unwrap_or_default()
    }
}

// == OpenAI Provider ==
/// Chat-completions client for OpenAI or any API-compatible server.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    /// Creates a provider whose calls are bounded by `timeout`.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key,
        })
    }

    /// Creates a provider from the gateway configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.provider_base_url,
            config.provider_model.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.provider_timeout),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            n: 1,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(
                        status = status.as_u16(),
                        error = %err,
                        "Failed to read provider error body"
                    );
                    String::new()
                }
            };
            tracing::warn!(status = status.as_u16(), body = %body, "Provider response not ok");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        let completion: ChatCompletion = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Internal(format!("unreadable provider payload: {e}")))?;

        Ok(completion.into_text())
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Transport("provider call timed out".to_string())
    } else {
        GatewayError::Transport(err.to_string())
    }
}
