//! # calclaw
//!
//! Conversational calendar booking assistant.
//!
//! ## Overview
//!
//! calclaw turns natural-language scheduling requests — "book a meeting
//! Tuesday at 3pm", "move my standup to Friday", "am I free on the 21st?" —
//! into calendar operations. A language-model agent picks among five typed
//! tools; the tools drive a thin adapter over the remote calendar, which
//! stays the single source of truth.
//!
//! ## Core Concepts
//!
//! - **Calendar Adapter**: five live operations against the remote calendar,
//!   with a boolean failure contract for the mutating ones
//! - **Tool Registry**: an immutable catalog of (name, description, schema,
//!   invoke) bindings shared across all requests
//! - **Booking Agent**: one model client plus one process-global
//!   conversation, serialized behind a mutex
//! - **Chat Endpoint**: `POST /chat` — `{message}` in, `{response}` out
//!
//! ## Example
//!
//! ```rust,ignore
//! use calclaw::{AppConfig, AppState, BookingAgent, CalendarClient, ToolRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = AppConfig::load("calclaw.json")?;
//!     config.apply_env();
//!     config.validate()?;
//!
//!     let calendar = Arc::new(CalendarClient::new(&config.calendar)?);
//!     let registry = Arc::new(ToolRegistry::with_calendar_tools(calendar, config.assume));
//!     let agent = BookingAgent::new(&config.llm, registry.clone(), config.assume);
//!
//!     let state = Arc::new(AppState { agent, registry });
//!     calclaw::server::serve(state, &config.server_addr(), true).await?;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod calendar;
pub mod config;
pub mod error;
pub mod server;
pub mod tools;

// Re-export commonly used types
pub use agent::{BookingAgent, ChatMessage, LlmClient};
pub use calendar::CalendarClient;
pub use config::AppConfig;
pub use error::{Error, Result};
pub use server::{AppState, ChatRequest, ChatResponse};
pub use tools::{Tool, ToolDescriptor, ToolRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
