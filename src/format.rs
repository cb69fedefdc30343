// Display helpers for derived task state

use crate::task::Task;
use chrono::{Local, TimeZone};

/// Format a millisecond duration as `HH:MM:SS`.
///
/// Hours are not capped, so 100 hours and up render with three or more
/// digits. Negative durations clamp to zero.
pub fn format_duration(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format an epoch-millis timestamp in local time
pub fn format_time(ts: i64) -> String {
    match Local.timestamp_millis_opt(ts).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "invalid date".to_string(),
    }
}

/// One-line status for a task as of `now`
pub fn status_text(task: &Task, now: i64) -> String {
    if task.completed {
        return match task.elapsed_ms() {
            Some(elapsed) => format!("Completed in {}", format_duration(elapsed)),
            None => "Completed".to_string(),
        };
    }

    if task.is_overdue_at(now) {
        return "Overdue (Deadline missed)".to_string();
    }

    match task.deadline {
        Some(deadline) => format!("Deadline: {}", format_time(deadline)),
        None => "Deadline: invalid date".to_string(),
    }
}
