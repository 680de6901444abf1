//! End-to-end tests for the chat endpoint.
//!
//! Boots the real router with both external collaborators mocked: the
//! calendar REST API and the chat-completions API each run on a wiremock
//! server, and requests go through a real TCP socket.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use calclaw::agent::BookingAgent;
use calclaw::calendar::CalendarClient;
use calclaw::config::{CalendarConfig, DateAssumptions, LlmConfig};
use calclaw::server::{router, AppState, ChatResponse};
use calclaw::tools::ToolRegistry;

async fn spawn_app(llm_server: &MockServer, calendar_server: &MockServer) -> SocketAddr {
    let calendar_config = CalendarConfig {
        api_base: calendar_server.uri(),
        calendar_id: "primary".to_string(),
        timezone: "Asia/Kolkata".to_string(),
        api_token: "test-token".to_string(),
    };
    let llm_config = LlmConfig {
        api_base: llm_server.uri(),
        model: "gpt-4o-mini".to_string(),
        api_key: "test-key".to_string(),
        max_iterations: 10,
    };

    let calendar = Arc::new(CalendarClient::new(&calendar_config).expect("calendar client"));
    let registry = Arc::new(ToolRegistry::with_calendar_tools(
        calendar,
        DateAssumptions::default(),
    ));
    let agent = BookingAgent::new(&llm_config, registry.clone(), DateAssumptions::default());

    let state = Arc::new(AppState { agent, registry });
    let app = router(state, true);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    addr
}

fn tool_reply(call_id: &str, name: &str, arguments: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": {
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": call_id,
                "type": "function",
                "function": { "name": name, "arguments": arguments }
            }]
        } }]
    })
}

fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": text } }]
    })
}

#[tokio::test]
async fn chat_round_trip_books_an_event() {
    let llm_server = MockServer::start().await;
    let calendar_server = MockServer::start().await;

    // Turn 1: the model books; turn 2: it confirms in plain language.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_reply(
            "call-1",
            "create_event",
            "{\"title\":\"Design review\",\
              \"start_time\":\"2025-07-15T15:00:00\",\
              \"end_time\":\"2025-07-15T16:00:00\"}",
        )))
        .up_to_n_times(1)
        .mount(&llm_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_reply("Booked your design review for 3pm on the 15th.")),
        )
        .mount(&llm_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ev-7" })))
        .expect(1)
        .mount(&calendar_server)
        .await;

    let addr = spawn_app(&llm_server, &calendar_server).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/chat", addr))
        .json(&json!({ "message": "book a design review on the 15th at 3pm" }))
        .send()
        .await
        .expect("request");

    assert!(response.status().is_success());
    let body: ChatResponse = response.json().await.expect("body");
    assert_eq!(body.response, "Booked your design review for 3pm on the 15th.");
}

#[tokio::test]
async fn chat_failure_is_a_generic_500() {
    let llm_server = MockServer::start().await;
    let calendar_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&llm_server)
        .await;

    let addr = spawn_app(&llm_server, &calendar_server).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/chat", addr))
        .json(&json!({ "message": "hi" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.expect("body");
    // Generic failure only; no provider detail leaks to the caller
    assert_eq!(
        body["error"],
        "The assistant could not complete this request."
    );
}

#[tokio::test]
async fn health_endpoint_responds() {
    let llm_server = MockServer::start().await;
    let calendar_server = MockServer::start().await;

    let addr = spawn_app(&llm_server, &calendar_server).await;

    let body = reqwest::get(format!("http://{}/health", addr))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn tools_endpoint_lists_the_catalog() {
    let llm_server = MockServer::start().await;
    let calendar_server = MockServer::start().await;

    let addr = spawn_app(&llm_server, &calendar_server).await;

    let body: serde_json::Value = reqwest::get(format!("http://{}/tools", addr))
        .await
        .expect("request")
        .json()
        .await
        .expect("body");

    let tools = body.as_array().expect("array");
    assert_eq!(tools.len(), 5);
    assert_eq!(tools[0]["name"], "check_availability");
    assert!(tools[0]["schema"]["properties"]["date_to_be_checked"].is_object());
}

#[tokio::test]
async fn consecutive_turns_share_the_conversation() {
    let llm_server = MockServer::start().await;
    let calendar_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("First.")))
        .up_to_n_times(1)
        .mount(&llm_server)
        .await;
    // The second turn's history must still contain the first exchange.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(wiremock::matchers::body_partial_json(json!({
            "messages": [
                { "role": "system" },
                { "role": "user", "content": "one" },
                { "role": "assistant", "content": "First." },
                { "role": "user", "content": "two" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Second.")))
        .mount(&llm_server)
        .await;

    let addr = spawn_app(&llm_server, &calendar_server).await;
    let client = reqwest::Client::new();

    for (message, expected) in [("one", "First."), ("two", "Second.")] {
        let body: ChatResponse = client
            .post(format!("http://{}/chat", addr))
            .json(&json!({ "message": message }))
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("body");
        assert_eq!(body.response, expected);
    }
}
