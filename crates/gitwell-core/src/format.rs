//! Formatting utilities

use chrono::{DateTime, Utc};

/// Format a count compactly (1.2K, 3.4M, 5.6B)
pub fn compact_number(n: u64) -> String {
    let value = n as f64;
    if n >= 1_000_000_000 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format a 0-1 ratio as a percentage.
///
/// Without an explicit precision, whole percentages print bare ("85%") and
/// everything else gets two decimals ("33.33%").
pub fn percentage(ratio: f64, decimals: Option<usize>) -> String {
    let pct = ratio * 100.0;
    match decimals {
        Some(d) => format!("{:.*}%", d, pct),
        None if pct.fract() == 0.0 => format!("{}%", pct),
        None => format!("{:.2}%", pct),
    }
}

/// Format a byte count (B, KB, MB, GB, TB)
pub fn file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", size, UNITS[unit])
}

/// Format a timestamp relative to `now` (e.g., "2h ago")
pub fn relative_time(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(dt);
    let days = diff.num_days();

    if diff.num_seconds() < 60 {
        "just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else if days < 30 {
        format!("{}d ago", days)
    } else if days < 365 {
        format!("{}mo ago", days / 30)
    } else {
        format!("{}y ago", days / 365)
    }
}

/// Truncate a string to max length (in characters) with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
