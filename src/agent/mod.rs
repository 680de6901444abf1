//! Agent orchestration for calclaw.
//!
//! [`BookingAgent`] owns one model client and the tool registry, and drives
//! each chat turn through a bounded reasoning loop:
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                   BookingAgent                     │
//! │                                                    │
//! │   message ──▶ history ──▶ model ──┬─▶ final text   │
//! │                  ▲                │                │
//! │                  │          tool calls             │
//! │                  │                │                │
//! │                  └── results ◀── registry          │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! The conversation history is process-global: one history for the process
//! lifetime, not one per caller. A `tokio::sync::Mutex` guards it, which
//! also serializes concurrent chat requests — two simultaneous turns against
//! one shared history would interleave tool calls unpredictably otherwise.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{DateAssumptions, LlmConfig};
use crate::error::AgentError;
use crate::tools::ToolRegistry;

pub mod llm;

pub use llm::{ChatMessage, FunctionTool, LlmClient, ToolCall};

/// The conversational agent: one model client, one tool catalog, one
/// process-global conversation.
pub struct BookingAgent {
    llm: LlmClient,
    registry: Arc<ToolRegistry>,
    tools: Vec<FunctionTool>,
    history: Mutex<Vec<ChatMessage>>,
    max_iterations: usize,
}

impl BookingAgent {
    /// Wire the agent to a model client and a tool registry.
    pub fn new(config: &LlmConfig, registry: Arc<ToolRegistry>, assume: DateAssumptions) -> Self {
        let tools = registry
            .descriptors()
            .into_iter()
            .map(FunctionTool::from)
            .collect();

        let history = vec![ChatMessage::system(Self::system_prompt(assume))];

        Self {
            llm: LlmClient::new(config),
            registry,
            tools,
            history: Mutex::new(history),
            max_iterations: config.max_iterations,
        }
    }

    fn system_prompt(assume: DateAssumptions) -> String {
        format!(
            "You are a calendar booking assistant. You can check availability, \
             book meetings, reschedule them, cancel them, and look up an event id \
             from its start time, using the tools provided. \
             When the user does not specify a year assume {year}; when they do not \
             specify a month assume {month}. \
             When a tool reports an error, explain the problem in plain language \
             and suggest what to try next. Always answer in plain language.",
            year = assume.year,
            month = assume.month,
        )
    }

    /// Process one chat message and return the agent's final text.
    ///
    /// Runs at most `max_iterations` reasoning iterations; each one either
    /// ends the turn with final text or executes the requested tool calls and
    /// feeds the results back. Exhausting the budget fails the turn.
    pub async fn chat(&self, message: &str) -> Result<String, AgentError> {
        // Serializes concurrent turns for the lifetime of this request.
        let mut history = self.history.lock().await;
        history.push(ChatMessage::user(message));

        for iteration in 0..self.max_iterations {
            let reply = self.llm.complete(&history, &self.tools).await?;

            if !reply.requests_tools() {
                let text = reply.content.clone().unwrap_or_default();
                history.push(reply);
                info!(iterations = iteration + 1, "chat turn complete");
                return Ok(text);
            }

            let calls = reply.tool_calls.clone().unwrap_or_default();
            history.push(reply);

            for call in calls {
                debug!(tool = %call.function.name, call_id = %call.id, "model requested tool");
                let arguments: Value =
                    serde_json::from_str(&call.function.arguments).unwrap_or(Value::Null);
                let output = self.registry.dispatch(&call.function.name, arguments).await;
                history.push(ChatMessage::tool(call.id, output));
            }
        }

        Err(AgentError::IterationBudget(self.max_iterations))
    }

    /// Number of messages in the shared conversation, system prompt included.
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::calendar::CalendarClient;
    use crate::config::CalendarConfig;

    fn llm_config(api_base: String, max_iterations: usize) -> LlmConfig {
        LlmConfig {
            api_base,
            model: "gpt-4o-mini".to_string(),
            api_key: "test-key".to_string(),
            max_iterations,
        }
    }

    async fn test_agent(
        llm_server: &MockServer,
        calendar_server: &MockServer,
        max_iterations: usize,
    ) -> BookingAgent {
        let calendar_config = CalendarConfig {
            api_base: calendar_server.uri(),
            calendar_id: "primary".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            api_token: "test-token".to_string(),
        };
        let client = Arc::new(CalendarClient::new(&calendar_config).expect("client"));
        let registry = Arc::new(ToolRegistry::with_calendar_tools(
            client,
            DateAssumptions::default(),
        ));
        BookingAgent::new(
            &llm_config(llm_server.uri(), max_iterations),
            registry,
            DateAssumptions::default(),
        )
    }

    fn text_reply(text: &str) -> serde_json::Value {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        })
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

    #[tokio::test]
    async fn test_final_text_passes_through() {
        let llm_server = MockServer::start().await;
        let calendar_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Hello!")))
            .mount(&llm_server)
            .await;

        let agent = test_agent(&llm_server, &calendar_server, 10).await;
        let response = agent.chat("hi").await.unwrap();

        assert_eq!(response, "Hello!");
        // system + user + assistant
        assert_eq!(agent.history_len().await, 3);
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let llm_server = MockServer::start().await;
        let calendar_server = MockServer::start().await;

        // First iteration asks for a cancellation, second closes the turn.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_reply(
                "call-1",
                "cancel_event",
                "{\"event_id\":\"ev-42\"}",
            )))
            .up_to_n_times(1)
            .mount(&llm_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {},
                    {},
                    {},
                    { "role": "tool", "tool_call_id": "call-1", "content": "true" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Cancelled it.")))
            .mount(&llm_server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/ev-42"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&calendar_server)
            .await;

        let agent = test_agent(&llm_server, &calendar_server, 10).await;
        let response = agent.chat("cancel my 3pm meeting").await.unwrap();

        assert_eq!(response, "Cancelled it.");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_back_to_model() {
        let llm_server = MockServer::start().await;
        let calendar_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_reply(
                "call-1",
                "send_rocket",
                "{}",
            )))
            .up_to_n_times(1)
            .mount(&llm_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {},
                    {},
                    {},
                    { "role": "tool", "content": "Error: Unknown tool: send_rocket" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("I can't do that.")))
            .mount(&llm_server)
            .await;

        let agent = test_agent(&llm_server, &calendar_server, 10).await;
        let response = agent.chat("launch!").await.unwrap();

        assert_eq!(response, "I can't do that.");
    }

    #[tokio::test]
    async fn test_iteration_budget_enforced() {
        let llm_server = MockServer::start().await;
        let calendar_server = MockServer::start().await;

        // Model keeps asking for tools and never produces final text.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_reply(
                "call-n",
                "cancel_event",
                "{\"event_id\":\"ev-42\"}",
            )))
            .mount(&llm_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/ev-42"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&calendar_server)
            .await;

        let agent = test_agent(&llm_server, &calendar_server, 2).await;
        let err = agent.chat("cancel everything forever").await.unwrap_err();

        assert!(matches!(err, AgentError::IterationBudget(2)));
    }

    #[tokio::test]
    async fn test_model_failure_fails_the_turn() {
        let llm_server = MockServer::start().await;
        let calendar_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&llm_server)
            .await;

        let agent = test_agent(&llm_server, &calendar_server, 10).await;
        let err = agent.chat("hi").await.unwrap_err();

        assert!(matches!(err, AgentError::Api { status: 500, .. }));
    }
}
