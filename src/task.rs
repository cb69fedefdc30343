// Task record and the values derived from it

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Formats accepted for deadline input that carry no offset.
/// These are read as local wall-clock time, like a `datetime-local` field.
const LOCAL_DEADLINE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Minute-precision form with an explicit numeric offset; RFC 3339 requires seconds
const OFFSET_DEADLINE_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

/// A single todo item
///
/// Field names on the wire are camelCase: `id`, `title`, `completed`,
/// `createdAt`, `completedAt`, `deadline`. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: i64,
    #[serde(default)]
    pub completed_at: Option<i64>,
    /// `None` when the deadline input could not be parsed
    #[serde(default)]
    pub deadline: Option<i64>,
}

impl Task {
    /// Build a fresh, incomplete task.
    ///
    /// Nothing is validated here: an empty title is kept as-is and an
    /// unparseable deadline becomes `None`.
    pub fn new(title: impl Into<String>, deadline_input: &str) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            completed: false,
            created_at: now_ms(),
            completed_at: None,
            deadline: parse_deadline(deadline_input),
        }
    }

    /// Incomplete and past its deadline at `now`
    pub fn is_overdue_at(&self, now: i64) -> bool {
        !self.completed && self.deadline.is_some_and(|deadline| now > deadline)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(now_ms())
    }

    /// Time from creation to completion, for completed tasks only.
    ///
    /// `None` when the timestamps are missing or too far apart to subtract.
    pub fn elapsed_ms(&self) -> Option<i64> {
        match (self.completed, self.completed_at) {
            (true, Some(completed_at)) => completed_at.checked_sub(self.created_at),
            _ => None,
        }
    }
}

/// Parse user-supplied deadline input into epoch milliseconds.
///
/// Accepts RFC 3339 (seconds optional), `YYYY-MM-DDTHH:MM[:SS[.sss]]` /
/// `YYYY-MM-DD HH:MM[:SS[.sss]]` in local time or UTC with a trailing `Z`, and
/// a bare `YYYY-MM-DD` taken as UTC midnight.
pub fn parse_deadline(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.timestamp_millis());
    }

    if let Ok(dt) = DateTime::parse_from_str(input, OFFSET_DEADLINE_FORMAT) {
        return Some(dt.timestamp_millis());
    }

    if let Some(utc) = input.strip_suffix(['Z', 'z']) {
        return LOCAL_DEADLINE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(utc, format).ok())
            .map(|naive| naive.and_utc().timestamp_millis());
    }

    for format in LOCAL_DEADLINE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            // A wall-clock time skipped by a DST jump has no local instant
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before Unix epoch")
        .as_millis() as i64
}
