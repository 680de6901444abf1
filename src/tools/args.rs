//! Typed argument contracts for the calendar tools.
//!
//! Each operation has a serde-deserializable argument struct (the validation
//! side) and a JSON-schema value (the machine-readable signature handed to
//! the model). The two must describe the same shape; the tests pin that.
//!
//! Date-times are deliberately naive here: the model produces local wall
//! times, and the calendar adapter qualifies them with the configured zone.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::calendar::DEFAULT_WINDOW_MINUTES;

/// Arguments for the availability check.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckAvailabilityArgs {
    /// The date to check.
    pub date_to_be_checked: NaiveDate,
}

/// Arguments for event creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventArgs {
    /// Title (summary) of the event.
    pub title: String,
    /// Event start as a local wall time.
    pub start_time: NaiveDateTime,
    /// Event end as a local wall time.
    pub end_time: NaiveDateTime,
    /// Optional long-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Arguments for rescheduling an event.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventTimeArgs {
    /// The event identifier returned from creation.
    pub event_id: String,
    /// New start as a local wall time.
    pub new_start_time: NaiveDateTime,
    /// New end as a local wall time.
    pub new_end_time: NaiveDateTime,
}

/// Arguments for cancelling an event.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelEventArgs {
    /// The event identifier returned from creation.
    pub event_id: String,
}

/// Arguments for resolving an event id by approximate start time.
#[derive(Debug, Clone, Deserialize)]
pub struct GetEventIdByStartTimeArgs {
    /// Target start as a local wall time.
    pub start_time: NaiveDateTime,
    /// Minutes searched on either side of the target.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
}

fn default_window_minutes() -> i64 {
    DEFAULT_WINDOW_MINUTES
}

/// JSON schema for [`CheckAvailabilityArgs`].
pub fn check_availability_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "date_to_be_checked": {
                "type": "string",
                "format": "date",
                "description": "The date to check, as YYYY-MM-DD."
            }
        },
        "required": ["date_to_be_checked"]
    })
}

/// JSON schema for [`CreateEventArgs`].
pub fn create_event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": "Title (summary) of the event."
            },
            "start_time": {
                "type": "string",
                "description": "Event start as local time, YYYY-MM-DDTHH:MM:SS."
            },
            "end_time": {
                "type": "string",
                "description": "Event end as local time, YYYY-MM-DDTHH:MM:SS."
            },
            "description": {
                "type": "string",
                "description": "Optional long-form description."
            }
        },
        "required": ["title", "start_time", "end_time"]
    })
}

/// JSON schema for [`UpdateEventTimeArgs`].
pub fn update_event_time_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event_id": {
                "type": "string",
                "description": "The event id returned when the event was created."
            },
            "new_start_time": {
                "type": "string",
                "description": "New start as local time, YYYY-MM-DDTHH:MM:SS."
            },
            "new_end_time": {
                "type": "string",
                "description": "New end as local time, YYYY-MM-DDTHH:MM:SS."
            }
        },
        "required": ["event_id", "new_start_time", "new_end_time"]
    })
}

/// JSON schema for [`CancelEventArgs`].
pub fn cancel_event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event_id": {
                "type": "string",
                "description": "The event id returned when the event was created."
            }
        },
        "required": ["event_id"]
    })
}

/// JSON schema for [`GetEventIdByStartTimeArgs`].
pub fn get_event_id_by_start_time_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "start_time": {
                "type": "string",
                "description": "Target start as local time, YYYY-MM-DDTHH:MM:SS."
            },
            "window_minutes": {
                "type": "integer",
                "description": "Minutes searched on either side of start_time. Defaults to 60."
            }
        },
        "required": ["start_time"]
    })
}
