use std::time::Duration;

use fixenv::explain::*;
use fixenv_test_utils::*;
use wiremock::matchers::{body_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn explanation_is_first_choice_content() {
	let _ = env_logger::builder().is_test(true).try_init();
	let server = chat_server("Pin each package once.").await;
	let client = ChatClient::new(&config_for(&server)).expect("failed to create client.");

	let analysis = fixenv::Analysis::new(SAMPLE_CONFLICTING);
	let explanation = analysis.explain(&client).await.expect("explanation failed.");

	assert_eq!(explanation.text(), "Pin each package once.");
	assert_eq!(explanation.fingerprint(), analysis.fingerprint());
}

#[tokio::test]
async fn request_carries_prompt_and_model() {
	let server = MockServer::start().await;
	let expected = serde_json::json!({
		"model": "gpt-4o-mini",
		"messages": [{
			"role": "user",
			"content": "Explain these Python dependency conflicts and how to fix them clearly:\nnumpy: 1.20 vs 1.25\npandas: 1.3 vs 1.4"
		}]
	});
	Mock::given(method("POST"))
		.and(body_json(expected))
		.respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("ok")))
		.expect(1)
		.mount(&server)
		.await;

	let client = ChatClient::new(&config_for(&server)).expect("failed to create client.");
	let analysis = fixenv::Analysis::new(SAMPLE_CONFLICTING);
	assert_eq!(client.explain(analysis.conflicts()).await.expect("explanation failed."), "ok");
}

#[tokio::test]
async fn no_conflicts_means_no_request() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("unused")))
		.expect(0)
		.mount(&server)
		.await;

	let client = ChatClient::new(&config_for(&server)).expect("failed to create client.");
	let result = fixenv::Analysis::new(SAMPLE_CLEAN).explain(&client).await;
	assert!(matches!(result, Err(fixenv::Error::NothingToExplain)));
}

#[tokio::test]
async fn rejected_key_is_a_status_error() {
	let server = chat_server_with(ResponseTemplate::new(401).set_body_string("invalid api key")).await;
	let client = ChatClient::new(&config_for(&server)).expect("failed to create client.");

	match client.complete("hi".to_string()).await {
		Err(ExplainError::Status { status, body }) => {
			assert_eq!(status.as_u16(), 401);
			assert_eq!(body, "invalid api key");
		},
		other => panic!("expected status error, got {:?}", other),
	}
}

#[tokio::test]
async fn rate_limit_is_not_retried() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(429))
		.expect(1)
		.mount(&server)
		.await;

	let client = ChatClient::new(&config_for(&server)).expect("failed to create client.");
	let result = client.complete("hi".to_string()).await;
	assert!(matches!(result, Err(ExplainError::Status { status, .. }) if status.as_u16() == 429));
}

#[tokio::test]
async fn empty_choices_are_malformed() {
	let server = chat_server_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] }))).await;
	let client = ChatClient::new(&config_for(&server)).expect("failed to create client.");
	assert!(matches!(client.complete("hi".to_string()).await, Err(ExplainError::MalformedResponse(_))));
}

#[tokio::test]
async fn non_json_reply_is_malformed() {
	let server = chat_server_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>")).await;
	let client = ChatClient::new(&config_for(&server)).expect("failed to create client.");
	assert!(matches!(client.complete("hi".to_string()).await, Err(ExplainError::MalformedResponse(_))));
}

#[tokio::test]
async fn slow_service_times_out() {
	let server = chat_server_with(
		ResponseTemplate::new(200)
			.set_body_json(chat_reply("too late"))
			.set_delay(Duration::from_secs(5))
	).await;
	let mut config = config_for(&server);
	assert!(config.set_timeout_secs(1));
	let client = ChatClient::new(&config).expect("failed to create client.");

	match client.complete("hi".to_string()).await {
		Err(ExplainError::Timeout(t)) => assert_eq!(t, Duration::from_secs(1)),
		other => panic!("expected timeout, got {:?}", other),
	}
}

#[tokio::test]
async fn https_only_refuses_plain_http() {
	let server = chat_server("unused").await;
	let mut config = config_for(&server);
	config.set_https_only(true);
	let client = ChatClient::new(&config).expect("failed to create client.");
	assert!(matches!(client.complete("hi".to_string()).await, Err(ExplainError::Reqwest(_))));
}
