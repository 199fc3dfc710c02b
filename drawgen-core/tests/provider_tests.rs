//! Provider client tests against a mocked upstream

use drawgen_core::config::{ProviderConfig, ProviderKind};
use drawgen_core::protocol::ChatMessage;
use drawgen_core::providers::{ChatStreamer, LlmClient, ProviderError};
use futures::StreamExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_config(base_url: &str) -> ProviderConfig {
    ProviderConfig::new(ProviderKind::OpenAi, base_url, "sk-test", "gpt-4o")
}

fn anthropic_config(base_url: &str) -> ProviderConfig {
    ProviderConfig::new(
        ProviderKind::Anthropic,
        base_url,
        "sk-ant-test",
        "claude-3-5-sonnet-20241022",
    )
}

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You draw diagrams"),
        ChatMessage::user("draw a flow"),
    ]
}

#[tokio::test]
async fn openai_stream_decodes_end_to_end() {
    let server = MockServer::start().await;

    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n\
data: [DONE]\n\n";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = LlmClient::new().unwrap();
    let stream = client
        .stream_chat(&openai_config(&server.uri()), conversation())
        .await
        .unwrap();

    let deltas: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
    assert_eq!(deltas, vec!["Hello", " world"]);
    assert_eq!(deltas.concat(), "Hello world");
}

#[tokio::test]
async fn unauthorized_fails_before_any_streaming() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid api key"}"#),
        )
        .mount(&server)
        .await;

    let client = LlmClient::new().unwrap();
    let result = client
        .stream_chat(&openai_config(&server.uri()), conversation())
        .await;

    // The call fails as a whole; no stream is ever handed out.
    match result {
        Err(ProviderError::Authentication(body)) => {
            assert!(body.contains("invalid api key"));
        }
        other => panic!("expected authentication error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn upstream_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = LlmClient::new().unwrap();
    let result = client
        .stream_chat(&openai_config(&server.uri()), conversation())
        .await;

    match result {
        Err(ProviderError::Upstream {
            provider,
            status,
            body,
        }) => {
            assert_eq!(provider, "openai");
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected upstream error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn anthropic_request_hoists_system_and_sets_headers() {
    let server = MockServer::start().await;

    let body = "data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"ok\"}}\n\n\
data: {\"type\":\"message_stop\"}\n\n";

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = LlmClient::new().unwrap();
    let stream = client
        .stream_chat(&anthropic_config(&server.uri()), conversation())
        .await
        .unwrap();
    let deltas: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
    assert_eq!(deltas, vec!["ok"]);

    // Inspect the captured request body: the system text lives only in
    // the top-level field, never inside the messages array.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(sent["system"], "You draw diagrams");
    assert_eq!(sent["stream"], true);
    assert_eq!(sent["max_tokens"], 4096);
    let messages = sent["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");

    // Invalid configurations never reach the wire.
    let mut invalid = anthropic_config(&server.uri());
    invalid.model = String::new();
    assert!(client
        .stream_chat(&invalid, conversation())
        .await
        .is_err());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn openai_models_are_listed_with_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"object":"list","data":[{"id":"gpt-4o"},{"id":"gpt-4o-mini"}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let client = LlmClient::new().unwrap();
    let models = client
        .list_models(ProviderKind::OpenAi, &server.uri(), "sk-test")
        .await
        .unwrap();

    let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["gpt-4o", "gpt-4o-mini"]);
}

#[tokio::test]
async fn anthropic_models_come_from_the_builtin_catalogue() {
    // No server involved at all.
    let client = LlmClient::new().unwrap();
    let models = client
        .list_models(
            ProviderKind::Anthropic,
            "https://api.anthropic.com/v1",
            "sk-ant-test",
        )
        .await
        .unwrap();

    assert!(models.iter().any(|m| m.id == "claude-3-5-sonnet-20241022"));
    assert!(models.iter().all(|m| !m.name.is_empty()));
}
