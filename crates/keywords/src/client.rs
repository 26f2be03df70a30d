//! Blocking client for the message-generation endpoint.

use serde::{Deserialize, Serialize};
use slidemark_core::KeywordSource;
use std::time::Duration;
use ureq::AgentBuilder;

use crate::error::KeywordError;
use crate::json::first_json_object;
use crate::prompt::build_prompt;
use crate::validate::validate_keywords;

/// Messages endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
/// Value of the `anthropic-version` header.
pub const API_VERSION: &str = "2023-06-01";
/// Output token limit per request.
pub const MAX_OUTPUT_TOKENS: u32 = 200;

/// Connection settings for the keyword service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sent as `x-api-key`. Not checked up front; an empty key fails per request.
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    /// Overall per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: MAX_OUTPUT_TOKENS,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeywordList {
    #[serde(default)]
    keywords: Vec<String>,
}

/// Keyword service client. One blocking request per call, no retries.
pub struct AnthropicClient {
    config: ClientConfig,
    agent: ureq::Agent,
}

impl AnthropicClient {
    /// Create a client with its own connection agent.
    pub fn new(config: ClientConfig) -> Self {
        let agent = AgentBuilder::new().timeout(config.timeout).build();
        Self { config, agent }
    }

    /// Ask for up to `max_keywords` keywords for `slide_text`, validated
    /// against the text.
    pub fn request_keywords(
        &self,
        slide_text: &str,
        max_keywords: usize,
    ) -> Result<Vec<String>, KeywordError> {
        let prompt = build_prompt(slide_text, max_keywords);
        let payload = build_request_body(&self.config, &prompt)?;

        let response = self
            .agent
            .post(&self.config.endpoint)
            .set("Content-Type", "application/json")
            .set("x-api-key", &self.config.api_key)
            .set("anthropic-version", API_VERSION)
            .send_string(&payload);

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(KeywordError::Status {
                    status,
                    body: response.into_string().unwrap_or_default(),
                });
            }
            Err(e) => return Err(KeywordError::Transport(e.to_string())),
        };

        let body = response.into_string()?;
        let suggested = parse_keywords_response(&body)?;
        log::debug!("Service suggested {:?}", suggested);

        let mut keywords = validate_keywords(&suggested, slide_text);
        keywords.truncate(max_keywords);
        Ok(keywords)
    }
}

impl KeywordSource for AnthropicClient {
    fn keywords(&self, slide_number: usize, text: &str, max_keywords: usize) -> Vec<String> {
        match self.request_keywords(text, max_keywords) {
            Ok(keywords) => keywords,
            Err(KeywordError::Status { status, body }) => {
                log::warn!("API error for slide {}: {}", slide_number, status);
                log::debug!("Error body: {}", body);
                Vec::new()
            }
            Err(e) => {
                log::warn!("Error getting keywords for slide {}: {}", slide_number, e);
                Vec::new()
            }
        }
    }
}

/// JSON request body: model, output token limit, and one user message.
fn build_request_body(config: &ClientConfig, prompt: &str) -> Result<String, KeywordError> {
    let request = MessagesRequest {
        model: &config.model,
        max_tokens: config.max_tokens,
        messages: vec![Message {
            role: "user",
            content: prompt,
        }],
    };
    Ok(serde_json::to_string(&request)?)
}

/// Pull the keyword list out of a successful response body.
///
/// The first content block's text is searched for a JSON object; a missing
/// `keywords` field yields an empty list.
pub fn parse_keywords_response(body: &str) -> Result<Vec<String>, KeywordError> {
    let response: MessagesResponse = serde_json::from_str(body)?;
    let text = response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or(KeywordError::MissingText)?;

    let object = first_json_object(text.trim()).ok_or(KeywordError::NoJsonObject)?;
    let list: KeywordList = serde_json::from_str(object)?;
    Ok(list.keywords)
}
