//! Various helper functions for testing
//! 
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::io::Write;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The default input of the original demo, two packages with two versions each.
pub const SAMPLE_CONFLICTING: &str = "numpy==1.20\nnumpy==1.25\npandas==1.3\npandas==1.4";
/// Placeholder input with no conflicts.
pub const SAMPLE_CLEAN: &str = "numpy==1.25\npandas==2.0.3\nmatplotlib==3.7.1";

pub const CHAT_PATH: &str = "/v1/chat/completions";
pub const TEST_API_KEY: &str = "test-key";

#[derive(Debug, thiserror::Error)]
pub enum TestUtilsError {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
}

/// A chat completions reply with a single choice.
pub fn chat_reply(content: &str) -> serde_json::Value {
	serde_json::json!({
		"id": "chatcmpl-test",
		"object": "chat.completion",
		"model": fixenv::config::DEFAULT_MODEL,
		"choices": [{
			"index": 0,
			"message": { "role": "assistant", "content": content },
			"finish_reason": "stop"
		}]
	})
}

/// Starts a server answering every authorised completion request with `response`.
pub async fn chat_server_with(response: ResponseTemplate) -> MockServer {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path(CHAT_PATH))
		.and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
		.respond_with(response)
		.mount(&server)
		.await;
	server
}

/// Starts a server that replies to completion requests with `content`.
pub async fn chat_server(content: &str) -> MockServer {
	chat_server_with(ResponseTemplate::new(200).set_body_json(chat_reply(content))).await
}

/// Config pointing at `server` with a test key, plain http allowed.
pub fn config_for(server: &MockServer) -> fixenv::Config {
	let mut config = fixenv::Config::default();
	config.set_api_url(format!("{}{}", server.uri(), CHAT_PATH));
	config.set_api_key(Some(TEST_API_KEY.to_string()));
	config.set_https_only(false);
	config
}

/// Writes `contents` to a temporary file, deleted when dropped.
pub fn requirements_file(contents: impl AsRef<[u8]>) -> Result<tempfile::NamedTempFile, TestUtilsError> {
	let mut file = tempfile::Builder::new().prefix("requirements").suffix(".txt").tempfile()?;
	file.write_all(contents.as_ref())?;
	file.flush()?;
	Ok(file)
}
