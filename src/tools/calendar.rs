//! Calendar tool implementations.
//!
//! One tool per adapter operation. Descriptions carry the domain convention
//! for underspecified dates: when the user leaves the year or month out of a
//! request, the model is told to assume the configured current year/month.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::calendar::CalendarClient;
use crate::config::DateAssumptions;
use crate::error::ToolError;
use super::args::{
    cancel_event_schema, check_availability_schema, create_event_schema,
    get_event_id_by_start_time_schema, update_event_time_schema, CancelEventArgs,
    CheckAvailabilityArgs, CreateEventArgs, GetEventIdByStartTimeArgs, UpdateEventTimeArgs,
};
use super::Tool;

fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Checks whether a day has any busy slots.
pub struct CheckAvailabilityTool {
    client: Arc<CalendarClient>,
    description: String,
}

impl CheckAvailabilityTool {
    /// Create the tool over the given adapter.
    pub fn new(client: Arc<CalendarClient>, assume: DateAssumptions) -> Self {
        let description = format!(
            "Check the user's calendar for busy time slots on a specific day. \
             If the year is not specified take the current year ({}). \
             If the month is not specified take the current month ({}). \
             Returns true if the user is free on the date, false otherwise.",
            assume.year, assume.month
        );
        Self { client, description }
    }
}

#[async_trait]
impl Tool for CheckAvailabilityTool {
    fn name(&self) -> &str {
        "check_availability"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> Value {
        check_availability_schema()
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        let args: CheckAvailabilityArgs = parse_args(arguments)?;
        let free = self.client.is_free_on_date(args.date_to_be_checked).await;
        Ok(free.to_string())
    }
}

/// Books a new calendar event.
pub struct CreateEventTool {
    client: Arc<CalendarClient>,
    description: String,
}

impl CreateEventTool {
    /// Create the tool over the given adapter.
    pub fn new(client: Arc<CalendarClient>, assume: DateAssumptions) -> Self {
        let description = format!(
            "Create a calendar event. \
             If the year is not specified take the current year ({}). \
             If the month is not specified take the current month ({}). \
             Returns the event id of the newly created event.",
            assume.year, assume.month
        );
        Self { client, description }
    }
}

#[async_trait]
impl Tool for CreateEventTool {
    fn name(&self) -> &str {
        "create_event"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> Value {
        create_event_schema()
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        let args: CreateEventArgs = parse_args(arguments)?;
        let id = self
            .client
            .create_event(
                &args.title,
                args.start_time,
                args.end_time,
                args.description.as_deref(),
            )
            .await?;
        Ok(id)
    }
}

/// Reschedules an existing event.
pub struct UpdateEventTimeTool {
    client: Arc<CalendarClient>,
}

impl UpdateEventTimeTool {
    /// Create the tool over the given adapter.
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for UpdateEventTimeTool {
    fn name(&self) -> &str {
        "update_event_time"
    }

    fn description(&self) -> &str {
        "Update the start/end time of an existing event. \
         Returns true if the update succeeded."
    }

    fn schema(&self) -> Value {
        update_event_time_schema()
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        let args: UpdateEventTimeArgs = parse_args(arguments)?;
        let ok = self
            .client
            .update_event_time(&args.event_id, args.new_start_time, args.new_end_time)
            .await;
        Ok(ok.to_string())
    }
}

/// Cancels (deletes) an event.
pub struct CancelEventTool {
    client: Arc<CalendarClient>,
}

impl CancelEventTool {
    /// Create the tool over the given adapter.
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CancelEventTool {
    fn name(&self) -> &str {
        "cancel_event"
    }

    fn description(&self) -> &str {
        "Cancel (delete) an event from the calendar. \
         Returns true if the deletion succeeded."
    }

    fn schema(&self) -> Value {
        cancel_event_schema()
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        let args: CancelEventArgs = parse_args(arguments)?;
        let ok = self.client.cancel_event(&args.event_id).await;
        Ok(ok.to_string())
    }
}

/// Resolves an event id from an approximate start time.
pub struct GetEventIdByStartTimeTool {
    client: Arc<CalendarClient>,
}

impl GetEventIdByStartTimeTool {
    /// Create the tool over the given adapter.
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetEventIdByStartTimeTool {
    fn name(&self) -> &str {
        "get_event_id_by_start_time"
    }

    fn description(&self) -> &str {
        "Get the event id of an event by its start time. \
         Returns the event id, or reports that no event was found near that time."
    }

    fn schema(&self) -> Value {
        get_event_id_by_start_time_schema()
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        let args: GetEventIdByStartTimeArgs = parse_args(arguments)?;
        let found = self
            .client
            .find_event_by_start_time(args.start_time, args.window_minutes)
            .await?;

        // Absence is a valid answer, not a tool failure.
        Ok(match found {
            Some(id) => id,
            None => format!(
                "No event found within {} minutes of {}.",
                args.window_minutes, args.start_time
            ),
        })
    }
}
