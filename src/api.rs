use crate::config::AppConfig;
use crate::error::{ChatError, ConfigError};
use crate::utils::find_char_boundary;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

/// Longest slice of a provider error body shown to the user.
const MAX_ERROR_BODY: usize = 500;

// ── Request / Response types (OpenAI chat completions format) ───────────

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize, Debug)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl<'a> ChatRequest<'a> {
    /// A context-free request: exactly one user message, nothing else.
    fn single_turn(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

/// Something that turns one prompt into one reply.
///
/// The chat loop only talks to this trait, so tests can swap in a stub.
#[allow(async_fn_in_trait)]
pub trait Completion {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError>;
}

/// Client for an OpenAI-compatible chat-completions endpoint, bound to one key.
pub struct OpenAiClient {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| ConfigError::InvalidApiKey)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        // No timeout: a turn waits until the provider answers or the transport fails.
        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            url: config.chat_completions_url(),
            model: config.model.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Completion for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let body = ChatRequest::single_turn(&self.model, prompt);

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|source| ChatError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = resp.status();
        let text_body = resp.text().await.map_err(|source| ChatError::Transport {
            url: self.url.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(ChatError::Rejected {
                status,
                body: text_body[..find_char_boundary(&text_body, MAX_ERROR_BODY)].to_string(),
            });
        }

        extract_reply(&text_body)
    }
}

/// Pull `choices[0].message.content` out of a raw response body.
fn extract_reply(raw: &str) -> Result<String, ChatError> {
    let parsed: ChatResponse = serde_json::from_str(raw).map_err(|e| {
        ChatError::Malformed(format!(
            "{}. Raw body: {}",
            e,
            &raw[..find_char_boundary(raw, MAX_ERROR_BODY)]
        ))
    })?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Malformed("no choices in response".to_string()))?;

    choice
        .message
        .content
        .ok_or_else(|| ChatError::Malformed("first choice has no message content".to_string()))
}
