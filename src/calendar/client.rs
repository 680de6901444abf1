//! Remote calendar adapter.
//!
//! [`CalendarClient`] wraps the calendar REST API behind the five operations
//! the assistant exposes as tools. The remote calendar is the single source
//! of truth: nothing is cached, every operation is a live request.
//!
//! Failure contract: the boolean operations (`is_free_on_date`,
//! `update_event_time`, `cancel_event`) never propagate remote errors — the
//! underlying [`CalendarError`] is logged and collapsed to `false`. Creation
//! and resolution propagate errors so the tool layer can report them to the
//! agent.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::config::CalendarConfig;
use crate::error::{CalendarError, ConfigError};
use super::types::{
    BusyInterval, EventList, EventRef, EventTime, FreeBusyItem, FreeBusyRequest, FreeBusyResponse,
    NewEvent,
};

/// Default matching window for [`CalendarClient::find_event_by_start_time`].
pub const DEFAULT_WINDOW_MINUTES: i64 = 60;

/// Client for a single remote calendar.
pub struct CalendarClient {
    http: reqwest::Client,
    api_base: String,
    calendar_id: String,
    api_token: String,
    tz: Tz,
}

impl CalendarClient {
    /// Create a new client from the calendar configuration.
    pub fn new(config: &CalendarConfig) -> Result<Self, ConfigError> {
        let tz: Tz = config.timezone.parse().map_err(|_| ConfigError::InvalidValue {
            key: "calendar.timezone".to_string(),
            reason: format!("'{}' is not a known IANA timezone", config.timezone),
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            api_token: config.api_token.clone(),
            tz,
        })
    }

    /// The configured default timezone.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Check whether the calendar has no busy intervals on the given date.
    ///
    /// Queries free/busy over [00:00, 23:59] local time. The final minute of
    /// the day is outside the range, so an event ending exactly at midnight
    /// can be missed; this boundary is inherited, not a contract guarantee.
    pub async fn is_free_on_date(&self, date: NaiveDate) -> bool {
        match self.busy_intervals_on(date).await {
            Ok(busy) => busy.is_empty(),
            Err(err) => {
                warn!(%date, error = %err, "free/busy query failed");
                false
            }
        }
    }

    async fn busy_intervals_on(&self, date: NaiveDate) -> Result<Vec<BusyInterval>, CalendarError> {
        let day_start = self.localize(date.and_time(NaiveTime::MIN))?;
        let day_end = date
            .and_hms_opt(23, 59, 0)
            .ok_or_else(|| CalendarError::InvalidTime {
                value: date.to_string(),
                reason: "date has no 23:59 local time".to_string(),
            })
            .and_then(|naive| self.localize(naive))?;

        let body = FreeBusyRequest {
            time_min: day_start.to_rfc3339(),
            time_max: day_end.to_rfc3339(),
            time_zone: self.tz.name().to_string(),
            items: vec![FreeBusyItem { id: self.calendar_id.clone() }],
        };

        let url = format!("{}/freeBusy", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let parsed: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidResponse(e.to_string()))?;

        parsed
            .calendars
            .get(&self.calendar_id)
            .map(|c| c.busy.clone())
            .ok_or_else(|| {
                CalendarError::InvalidResponse(format!(
                    "free/busy response missing calendar '{}'",
                    self.calendar_id
                ))
            })
    }

    /// Create a calendar event and return its remote-assigned id.
    ///
    /// Naive times are resolved in the configured zone. No idempotency key is
    /// attached: calling twice with identical arguments creates two events.
    pub async fn create_event(
        &self,
        title: &str,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        description: Option<&str>,
    ) -> Result<String, CalendarError> {
        let start = self.localize(start_time)?;
        let end = self.localize(end_time)?;

        let body = NewEvent {
            summary: title.to_string(),
            description: description.unwrap_or_default().to_string(),
            start: EventTime::instant(start.to_rfc3339(), self.tz.name()),
            end: EventTime::instant(end.to_rfc3339(), self.tz.name()),
        };

        let url = format!("{}/calendars/{}/events", self.api_base, self.calendar_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .query(&[("sendUpdates", "all")])
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let created: EventRef = response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidResponse(e.to_string()))?;

        info!(event_id = %created.id, title, "created calendar event");
        Ok(created.id)
    }

    /// Move an existing event to a new start/end time.
    ///
    /// Fetches the event, overwrites only the start/end instants (every other
    /// field is sent back verbatim), and writes it back. Returns `false` when
    /// the fetch or the write fails for any reason, including an unknown id.
    /// Last-write-wins: there is no version check against concurrent edits.
    pub async fn update_event_time(
        &self,
        event_id: &str,
        new_start_time: NaiveDateTime,
        new_end_time: NaiveDateTime,
    ) -> bool {
        match self.try_update_event_time(event_id, new_start_time, new_end_time).await {
            Ok(()) => true,
            Err(err) => {
                warn!(event_id, error = %err, "event time update failed");
                false
            }
        }
    }

    async fn try_update_event_time(
        &self,
        event_id: &str,
        new_start_time: NaiveDateTime,
        new_end_time: NaiveDateTime,
    ) -> Result<(), CalendarError> {
        let start = self.localize(new_start_time)?;
        let end = self.localize(new_end_time)?;

        let url = format!(
            "{}/calendars/{}/events/{}",
            self.api_base, self.calendar_id, event_id
        );

        let response = self.http.get(&url).bearer_auth(&self.api_token).send().await?;
        let response = Self::ensure_success(response).await?;

        // Full resource as opaque JSON so unrelated fields round-trip intact.
        let mut event: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidResponse(e.to_string()))?;
        if !event.is_object() {
            return Err(CalendarError::InvalidResponse(
                "event resource is not a JSON object".to_string(),
            ));
        }
        event["start"]["dateTime"] = serde_json::Value::String(start.to_rfc3339());
        event["end"]["dateTime"] = serde_json::Value::String(end.to_rfc3339());

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.api_token)
            .query(&[("sendUpdates", "all")])
            .json(&event)
            .send()
            .await?;
        Self::ensure_success(response).await?;

        info!(event_id, "rescheduled calendar event");
        Ok(())
    }

    /// Cancel (delete) an event.
    ///
    /// Returns `false` on any failure, including "not found".
    pub async fn cancel_event(&self, event_id: &str) -> bool {
        match self.try_cancel_event(event_id).await {
            Ok(()) => true,
            Err(err) => {
                warn!(event_id, error = %err, "event cancellation failed");
                false
            }
        }
    }

    async fn try_cancel_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.api_base, self.calendar_id, event_id
        );
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.api_token)
            .query(&[("sendUpdates", "all")])
            .send()
            .await?;
        Self::ensure_success(response).await?;

        info!(event_id, "cancelled calendar event");
        Ok(())
    }

    /// Resolve an event id from an approximate start time.
    ///
    /// Lists single-occurrence events in [target − window, target + window]
    /// and returns the first one (in remote listing order, typically
    /// chronological) whose start lies within the window of the target —
    /// first match, not nearest match. `Ok(None)` means nothing matched;
    /// remote failures propagate.
    pub async fn find_event_by_start_time(
        &self,
        start_time: NaiveDateTime,
        window_minutes: i64,
    ) -> Result<Option<String>, CalendarError> {
        let target = self.localize(start_time)?;
        let window = Duration::minutes(window_minutes);
        let time_min = (target - window).to_rfc3339();
        let time_max = (target + window).to_rfc3339();

        let url = format!("{}/calendars/{}/events", self.api_base, self.calendar_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("timeZone", self.tz.name()),
            ])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let listing: EventList = response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidResponse(e.to_string()))?;

        for event in &listing.items {
            let Some(raw) = event.start.raw() else {
                continue;
            };
            let Some(candidate) = self.parse_event_start(raw) else {
                debug!(event_id = %event.id, raw, "skipping unparseable event start");
                continue;
            };

            if (candidate - target).num_seconds().abs() <= window_minutes * 60 {
                return Ok(Some(event.id.clone()));
            }
        }

        Ok(None)
    }

    /// Parse a listed event's start value.
    ///
    /// Prefers offset-qualified instants (including the trailing-`Z` form),
    /// then a naive date-time qualified with the default zone, then an
    /// all-day date taken as local midnight.
    fn parse_event_start(&self, raw: &str) -> Option<DateTime<Tz>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&self.tz));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
            return self.tz.from_local_datetime(&naive).earliest();
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        self.tz.from_local_datetime(&date.and_time(NaiveTime::MIN)).earliest()
    }

    /// Resolve a naive local time in the configured zone.
    fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Tz>, CalendarError> {
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(_, _) => Err(CalendarError::InvalidTime {
                value: naive.to_string(),
                reason: format!("local time is ambiguous in {}", self.tz.name()),
            }),
            LocalResult::None => Err(CalendarError::InvalidTime {
                value: naive.to_string(),
                reason: format!("local time is skipped by a transition in {}", self.tz.name()),
            }),
        }
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CalendarError::Api { status: status.as_u16(), message });
        }
        Ok(response)
    }
}
