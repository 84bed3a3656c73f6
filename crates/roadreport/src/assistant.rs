//! Traffic-rules assistant.
//!
//! Sends a single question, prefixed with a fixed system prompt, to an
//! OpenAI-compatible chat-completions endpoint and returns the first answer.
//! Each question is independent; no conversation history is kept.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// Instructions sent ahead of every question.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a specialized AI assistant for Traffic \
Violations Detection systems. You only answer questions related to traffic violations, \
traffic rules, vehicle detection, traffic safety, road regulations, and similar topics. \
If users ask about unrelated topics, politely redirect them to ask about traffic \
violations detection instead. Provide concise, technical, and helpful responses. Focus \
on practical aspects of traffic violation detection systems, technologies used and \
traffic rules.";

const USER_AGENT: &str = concat!("roadreport/", env!("CARGO_PKG_VERSION"));

/// One message in a chat-completions exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChatMessage>,
}

/// Client for the chat-completions endpoint.
#[derive(Clone)]
pub struct Assistant {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    system_prompt: String,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    /// Create a client from the assistant section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured, the endpoint is not a
    /// valid URL, or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = &config.assistant;
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingApiKey)?;

        let endpoint = Url::parse(&settings.endpoint).map_err(|e| {
            Error::config_validation(format!(
                "invalid assistant endpoint '{}': {e}",
                settings.endpoint
            ))
        })?;

        Ok(Self {
            client: build_client(config.assistant_timeout())?,
            endpoint,
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            system_prompt: settings.system_prompt.clone(),
        })
    }

    /// The endpoint questions are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask one question and return the trimmed answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the question is blank, the request fails, the
    /// endpoint answers with a non-success status, or the response holds no
    /// answer.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::EmptyQuestion);
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage::new("system", self.system_prompt.as_str()),
                ChatMessage::new("user", question),
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: 1.0,
            stream: false,
        };

        debug!("Asking {} ({} chars)", self.model, question.len());
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Assistant request failed with status {}", status.as_u16());
            return Err(Error::AssistantRejected {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response.json().await?;
        let answer = first_answer(body).ok_or(Error::EmptyCompletion)?;
        info!("Assistant answered ({} chars)", answer.len());
        Ok(answer)
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

fn first_answer(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .map(|m| m.content.trim().to_string())
}
