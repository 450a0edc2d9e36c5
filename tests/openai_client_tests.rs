//! OpenAI client tests against a mocked chat completions endpoint
//!
//! These tests use wiremock to stand in for the OpenAI API and validate:
//! - The request carries the configured model and temperature
//! - The prompt is sent as a single user message
//! - API errors surface as `AppError::LLM`

#![cfg(feature = "openai")]

use memroute::conversation::ConversationApp;
use memroute::llm::{LLMClient, Provider, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use memroute::types::AppError;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

/// Create a mock chat completion response
fn mock_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": DEFAULT_MODEL,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 2,
            "total_tokens": 12
        }
    })
}

async fn client_for(server: &MockServer) -> Box<dyn LLMClient> {
    Provider::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: server.uri(),
        model: DEFAULT_MODEL.to_string(),
        temperature: DEFAULT_TEMPERATURE,
    }
    .create_client()
    .await
    .unwrap()
}

// ============= Client Tests =============

#[tokio::test]
async fn test_generate_sends_model_and_temperature() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.0,
            "messages": [{"role": "user", "content": "What is 2+2?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("4")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let reply = client.generate("What is 2+2?").await.unwrap();

    assert_eq!(reply, "4");
    assert_eq!(client.model_name(), "gpt-4o-mini");
}

#[tokio::test]
async fn test_api_error_maps_to_llm_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Invalid model",
                "type": "invalid_request_error",
                "param": null,
                "code": null
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, AppError::LLM(_)));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;

    let mut body = mock_completion("");
    body["choices"] = json!([]);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, AppError::LLM(_)));
}

// ============= Through the graph =============

#[tokio::test]
async fn test_stm_prompt_reaches_the_api() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{
                "role": "user",
                "content": "You are the STM Agent.\n\
                            The last message was: \n\
                            Current user message: hi there\n\
                            Respond concisely."
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    let llm: Arc<dyn LLMClient> = Arc::from(client_for(&server).await);
    let app = ConversationApp::in_memory(llm).unwrap();

    let turn = app.invoke("s", "hi there").await.unwrap();
    assert_eq!(turn.response, "Hello!");
    assert_eq!(turn.state.last_message, "hi there");
}
