//! Tool layer for calclaw.
//!
//! Tools are the operations the reasoning model may invoke mid-conversation.
//! Each one binds a stable name, a natural-language description that primes
//! tool selection, a JSON-schema signature, and the adapter call itself.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 Tool Registry                    │
//! │  check_availability  create_event                │
//! │  update_event_time   cancel_event                │
//! │  get_event_id_by_start_time                      │
//! │                        │                         │
//! │                        ↓                         │
//! │              ┌──────────────────┐                │
//! │              │ Calendar Adapter │                │
//! │              └──────────────────┘                │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Uniform failure policy: an invocation that fails — unknown tool, bad
//! arguments, adapter error — is rendered as a tool-level error message
//! returned to the model, never a crash. The model can retry, apologize, or
//! pick a different tool.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::calendar::CalendarClient;
use crate::config::DateAssumptions;
use crate::error::ToolError;

pub mod args;
pub mod calendar;

pub use calendar::{
    CancelEventTool, CheckAvailabilityTool, CreateEventTool, GetEventIdByStartTimeTool,
    UpdateEventTimeTool,
};

/// Trait all callable tools implement.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable tool name the model invokes by.
    fn name(&self) -> &str;

    /// Natural-language description priming the model's tool selection.
    fn description(&self) -> &str;

    /// JSON schema the model must supply arguments against.
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with validated-against-schema JSON arguments.
    async fn invoke(&self, arguments: serde_json::Value) -> Result<String, ToolError>;

    /// The (name, description, schema) triple exposed to the model.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            schema: self.schema(),
        }
    }
}

/// A shared tool reference.
pub type DynTool = Arc<dyn Tool>;

/// Machine-readable tool signature.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Stable tool name.
    pub name: String,
    /// Natural-language description.
    pub description: String,
    /// JSON-schema argument signature.
    pub schema: serde_json::Value,
}

/// Registry binding the tools into one immutable, shareable catalog.
///
/// Constructed once at process start and shared read-only across all chat
/// requests.
pub struct ToolRegistry {
    tools: Vec<DynTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create the full calendar tool set over one adapter.
    pub fn with_calendar_tools(client: Arc<CalendarClient>, assume: DateAssumptions) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CheckAvailabilityTool::new(client.clone(), assume)));
        registry.register(Arc::new(CreateEventTool::new(client.clone(), assume)));
        registry.register(Arc::new(UpdateEventTimeTool::new(client.clone())));
        registry.register(Arc::new(CancelEventTool::new(client.clone())));
        registry.register(Arc::new(GetEventIdByStartTimeTool::new(client)));
        tracing::info!(count = registry.count(), "loaded calendar tools");
        registry
    }

    /// Register a tool. A later registration under the same name wins.
    pub fn register(&mut self, tool: DynTool) {
        let name = tool.name().to_string();
        if let Some(&slot) = self.index.get(&name) {
            self.tools[slot] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&DynTool> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Descriptors for the whole catalog, in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    /// Number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Invoke a tool by name, converting any failure into a tool-level
    /// error message for the model.
    pub async fn dispatch(&self, name: &str, arguments: serde_json::Value) -> String {
        tracing::debug!(tool = name, "dispatching tool call");

        let result = match self.get(name) {
            Some(tool) => tool.invoke(arguments).await,
            None => Err(ToolError::UnknownTool(name.to_string())),
        };

        match result {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "tool invocation failed");
                format!("Error: {}", err)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
