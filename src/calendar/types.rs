//! Wire types for the remote calendar REST API.
//!
//! Shapes follow the Google Calendar v3 resource layout: event boundaries are
//! objects carrying either a `dateTime` (RFC 3339 instant) or an all-day
//! `date`, with an optional `timeZone` label.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event boundary: a concrete instant or an all-day date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventTime {
    /// RFC 3339 instant, present for timed events.
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,

    /// Calendar date (YYYY-MM-DD), present for all-day events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// IANA timezone label for the instant.
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// Boundary for a timed event in the given zone.
    pub fn instant(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            date: None,
            time_zone: Some(time_zone.into()),
        }
    }

    /// The raw start value, preferring the timed form over the all-day form.
    pub fn raw(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// Body for an event insertion request.
#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    /// Event title.
    pub summary: String,

    /// Long-form description; the remote API treats missing and empty alike.
    pub description: String,

    /// Start boundary.
    pub start: EventTime,

    /// End boundary.
    pub end: EventTime,
}

/// The slice of a created/fetched event resource we rely on.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRef {
    /// Remote-assigned opaque identifier.
    pub id: String,
}

/// A listed event, as returned by the range query.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedEvent {
    /// Remote-assigned opaque identifier.
    pub id: String,

    /// Start boundary; may be empty for malformed items.
    #[serde(default)]
    pub start: EventTime,
}

/// Response to an event range listing.
#[derive(Debug, Clone, Deserialize)]
pub struct EventList {
    /// Events in remote-defined order (typically chronological).
    #[serde(default)]
    pub items: Vec<ListedEvent>,
}

/// Body for a free/busy query over one calendar.
#[derive(Debug, Clone, Serialize)]
pub struct FreeBusyRequest {
    /// Range lower bound (RFC 3339).
    #[serde(rename = "timeMin")]
    pub time_min: String,

    /// Range upper bound (RFC 3339).
    #[serde(rename = "timeMax")]
    pub time_max: String,

    /// Zone the busy intervals are reported in.
    #[serde(rename = "timeZone")]
    pub time_zone: String,

    /// Calendars to query.
    pub items: Vec<FreeBusyItem>,
}

/// A calendar reference inside a free/busy query.
#[derive(Debug, Clone, Serialize)]
pub struct FreeBusyItem {
    /// Calendar identifier.
    pub id: String,
}

/// Response to a free/busy query.
#[derive(Debug, Clone, Deserialize)]
pub struct FreeBusyResponse {
    /// Busy intervals keyed by calendar id.
    #[serde(default)]
    pub calendars: HashMap<String, CalendarBusy>,
}

/// Busy intervals for a single calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarBusy {
    /// Reported busy intervals; empty means free.
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
}

/// One reported busy interval.
#[derive(Debug, Clone, Deserialize)]
pub struct BusyInterval {
    /// Interval start (RFC 3339).
    pub start: String,

    /// Interval end (RFC 3339).
    pub end: String,
}
