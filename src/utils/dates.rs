//! Date and time utilities

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Format a playback position as "MM:SS" (minutes keep counting past the hour)
pub fn format_clock(position: Duration) -> String {
    let secs = position.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Parse "SS", "MM:SS" or "HH:MM:SS" into a duration
pub fn parse_clock(input: &str) -> Option<Duration> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut total: u64 = 0;
    for (i, part) in parts.iter().enumerate() {
        let value: u64 = part.trim().parse().ok()?;
        // every field but the first is bounded by 60
        if i > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
    }

    Some(Duration::from_secs(total))
}

/// Convert a timestamp to relative time string (e.g., "2 days ago")
pub fn timestamp_to_relative(at: DateTime<Utc>) -> String {
    chrono_humanize::HumanTime::from(at).to_string()
}
