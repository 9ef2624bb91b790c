//
//  harbor-client
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Functions
//!
//! Formatting and parsing helpers shared by the CLI commands:
//!
//! - **Time**: [`format_time`], [`format_relative_time`]
//! - **Sizes**: [`format_size`], [`parse_size`] for project quotas and
//!   storage statistics

use anyhow::{bail, Result};
use chrono::{DateTime, Local, Utc};

/// Formats a server timestamp in the local timezone.
///
/// Returns `"-"` when the server did not send one.
///
/// # Example
///
/// ```rust
/// use harbor_client::util::format_time;
///
/// assert_eq!(format_time(None), "-");
/// ```
pub fn format_time(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

/// Formats a timestamp relative to `now`, e.g. `"3 hours ago"`.
///
/// Months and years are approximated as 30 and 365 days.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_seconds();

    if diff < 0 {
        return "in the future".to_string();
    }

    let plural = |n: i64, unit: &str| format!("{n} {unit}{} ago", if n == 1 { "" } else { "s" });

    match diff {
        0..=59 => "just now".to_string(),
        60..=3_599 => plural(diff / 60, "minute"),
        3_600..=86_399 => plural(diff / 3_600, "hour"),
        86_400..=2_591_999 => plural(diff / 86_400, "day"),
        2_592_000..=31_535_999 => plural(diff / 2_592_000, "month"),
        _ => plural(diff / 31_536_000, "year"),
    }
}

const KB: i64 = 1024;
const MB: i64 = KB * 1024;
const GB: i64 = MB * 1024;
const TB: i64 = GB * 1024;

/// Formats a byte count with binary units. Negative values mean no limit.
///
/// # Example
///
/// ```rust
/// use harbor_client::util::format_size;
///
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(-1), "unlimited");
/// ```
pub fn format_size(bytes: i64) -> String {
    if bytes < 0 {
        return "unlimited".to_string();
    }

    let scaled = |unit: i64, suffix: &str| format!("{:.1} {suffix}", bytes as f64 / unit as f64);

    if bytes >= TB {
        scaled(TB, "TB")
    } else if bytes >= GB {
        scaled(GB, "GB")
    } else if bytes >= MB {
        scaled(MB, "MB")
    } else if bytes >= KB {
        scaled(KB, "KB")
    } else {
        format!("{bytes} B")
    }
}

/// Parses a quota such as `10GB`, `512 MB` or `1024`.
///
/// `-1` and `unlimited` yield `-1`, Harbor's value for no limit.
pub fn parse_size(s: &str) -> Result<i64> {
    let s = s.trim().to_uppercase();

    if s == "-1" || s == "UNLIMITED" {
        return Ok(-1);
    }

    let (num, unit) = [("TB", TB), ("GB", GB), ("MB", MB), ("KB", KB), ("B", 1)]
        .into_iter()
        .find_map(|(suffix, unit)| s.strip_suffix(suffix).map(|num| (num, unit)))
        .unwrap_or((s.as_str(), 1));

    let num: i64 = num.trim().parse()?;
    if num < 0 {
        bail!("size must not be negative: {s}");
    }

    Ok(num * unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(3 * GB / 2), "1.5 GB");
        assert_eq!(format_size(2 * TB), "2.0 TB");
        assert_eq!(format_size(-1), "unlimited");
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("10 gb").unwrap(), 10 * GB);
        assert_eq!(parse_size("unlimited").unwrap(), -1);
        assert_eq!(parse_size("-1").unwrap(), -1);
        assert!(parse_size("-5").is_err());
        assert!(parse_size("lots").is_err());
    }

    #[test]
    fn test_relative_time() {
        let now = Utc::now();
        assert_eq!(format_relative_time(now, now), "just now");
        assert_eq!(format_relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_relative_time(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(format_relative_time(now - Duration::days(400), now), "1 year ago");
        assert_eq!(format_relative_time(now + Duration::hours(1), now), "in the future");
    }
}
