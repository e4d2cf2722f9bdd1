// SPDX-License-Identifier: MIT

//! Date formatting for the activity feed.

use chrono::{DateTime, Datelike, Utc};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format a date as "Jan 1, 2025".
pub fn format_date(date: DateTime<Utc>) -> String {
    format!(
        "{} {}, {}",
        MONTHS[date.month0() as usize],
        date.day(),
        date.year()
    )
}

/// Relative "time ago" text for activity feeds.
///
/// Falls back to an absolute date once the entry is a week old.
pub fn time_ago(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(then) = timestamp else {
        return "Unknown".to_string();
    };

    let diff = now.signed_duration_since(then);
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins == 1 {
        "1 min ago".to_string()
    } else if mins < 60 {
        format!("{} min ago", mins)
    } else if hours == 1 {
        "1 hour ago".to_string()
    } else if hours < 24 {
        format!("{} hours ago", hours)
    } else if days == 1 {
        "1 day ago".to_string()
    } else if days < 7 {
        format!("{} days ago", days)
    } else {
        format_date(then)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(at(2025, 1, 1, 0, 0)), "Jan 1, 2025");
        assert_eq!(format_date(at(2024, 12, 31, 23, 59)), "Dec 31, 2024");
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = at(2025, 3, 10, 12, 0);

        assert_eq!(time_ago(None, now), "Unknown");
        assert_eq!(time_ago(Some(at(2025, 3, 10, 11, 59)), now), "1 min ago");
        assert_eq!(time_ago(Some(at(2025, 3, 10, 11, 15)), now), "45 min ago");
        assert_eq!(time_ago(Some(at(2025, 3, 10, 9, 0)), now), "3 hours ago");
        assert_eq!(time_ago(Some(at(2025, 3, 8, 12, 0)), now), "2 days ago");
        // A week old falls back to the absolute date
        assert_eq!(time_ago(Some(at(2025, 3, 1, 12, 0)), now), "Mar 1, 2025");
    }

    #[test]
    fn test_time_ago_just_now() {
        let now = at(2025, 3, 10, 12, 0);
        assert_eq!(time_ago(Some(now), now), "Just now");
    }
}
