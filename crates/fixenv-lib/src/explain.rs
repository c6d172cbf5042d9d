//! Asking a chat completion service to explain conflicts.
//!
//! One request per explanation, no retries. Failures are returned as [`ExplainError`] so the
//! caller can still show the detected conflicts when the service is unavailable.

use serde::{Serialize, Deserialize};

use crate::conflict::ConflictRecord;

pub const PROMPT_PREAMBLE: &str = "Explain these Python dependency conflicts and how to fix them clearly:\n";

/// Errors that can occur while requesting an explanation.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
	/// No API key was configured.
	#[error("no API key configured, set OPENAI_API_KEY.")]
	MissingApiKey,
	/// The service didn't answer within the configured timeout.
	#[error("request timed out after {0:?}.")]
	Timeout(std::time::Duration),
	/// The service answered with a non-success status, this covers bad credentials and rate limiting.
	#[error("service returned {status}: {body}")]
	Status {
		status: reqwest::StatusCode,
		body: String,
	},
	/// The reply didn't contain a message to use.
	#[error("malformed response: {0}")]
	MalformedResponse(String),
	#[error("reqwest error: {0}")]
	Reqwest(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: String,
	pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
	pub model: String,
	pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
	#[serde(default)]
	choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
	message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
	content: Option<String>,
}

/// The fixed instruction followed by one conflict description per line.
pub fn build_prompt(conflicts: &[ConflictRecord]) -> String {
	PROMPT_PREAMBLE.to_string() + &crate::conflict::describe(conflicts).join("\n")
}

/// The request body sent for `prompt`, a single user message.
pub fn build_request(model: &str, prompt: String) -> ChatRequest {
	ChatRequest {
		model: model.to_string(),
		messages: vec![ChatMessage { role: "user".to_string(), content: prompt }],
	}
}

/// Client for an OpenAI compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
	client: reqwest::Client,
	api_url: String,
	model: String,
	api_key: String,
	timeout: std::time::Duration,
}

impl ChatClient {
	/// # Errors
	/// - [`ExplainError::MissingApiKey`] when `config` has no key.
	/// - [`ExplainError::Reqwest`] if the HTTP client can't be built.
	pub fn new(config: &crate::Config) -> Result<Self, ExplainError> {
		let api_key = config.api_key().ok_or(ExplainError::MissingApiKey)?.to_string();
		let client = reqwest::Client::builder()
			.https_only(config.https_only())
			.timeout(config.timeout())
			.build()?;

		Ok(Self {
			client,
			api_url: config.api_url().to_string(),
			model: config.model().to_string(),
			api_key,
			timeout: config.timeout(),
		})
	}

	pub fn model(&self) -> &str {
		&self.model
	}

	/// Sends `prompt` and returns the text of the first choice.
	pub async fn complete(&self, prompt: String) -> Result<String, ExplainError> {
		let body = build_request(&self.model, prompt);

		log::info!("Requesting completion from {} using model {}", self.api_url, self.model);
		let response = self.client
			.post(&self.api_url)
			.bearer_auth(&self.api_key)
			.json(&body)
			.send()
			.await
			.map_err(|e| self.map_reqwest_error(e))?;

		let status = response.status();
		let text = response.text().await.map_err(|e| self.map_reqwest_error(e))?;
		if !status.is_success() {
			log::warn!("Completion request failed with status {}", status);
			return Err(ExplainError::Status { status, body: text });
		}

		let reply: ChatResponse = serde_json::from_str(&text)
			.map_err(|e| ExplainError::MalformedResponse(e.to_string()))?;
		reply.choices
			.into_iter()
			.next()
			.ok_or_else(|| ExplainError::MalformedResponse("no choices in response".to_string()))?
			.message
			.content
			.ok_or_else(|| ExplainError::MalformedResponse("first choice has no content".to_string()))
	}

	/// Explains `conflicts` in natural language.
	pub async fn explain(&self, conflicts: &[ConflictRecord]) -> Result<String, ExplainError> {
		log::debug!("Explaining {} conflict(s)", conflicts.len());
		self.complete(build_prompt(conflicts)).await
	}

	fn map_reqwest_error(&self, e: reqwest::Error) -> ExplainError {
		if e.is_timeout() {
			ExplainError::Timeout(self.timeout)
		} else {
			ExplainError::Reqwest(e)
		}
	}
}
