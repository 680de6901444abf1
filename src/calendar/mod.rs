//! Calendar integration for calclaw.
//!
//! Wraps the remote calendar service behind the five operations the
//! assistant exposes as tools:
//!
//! | Operation                   | Returns        | Remote failure       |
//! |-----------------------------|----------------|----------------------|
//! | `is_free_on_date`           | `bool`         | collapses to `false` |
//! | `create_event`              | event id       | propagates           |
//! | `update_event_time`         | `bool`         | collapses to `false` |
//! | `cancel_event`              | `bool`         | collapses to `false` |
//! | `find_event_by_start_time`  | `Option<id>`   | propagates           |
//!
//! The remote calendar is the single source of truth; nothing is cached
//! between operations.

pub mod client;
pub mod types;

pub use client::{CalendarClient, DEFAULT_WINDOW_MINUTES};
pub use types::{BusyInterval, EventList, EventTime, FreeBusyRequest, FreeBusyResponse, NewEvent};
