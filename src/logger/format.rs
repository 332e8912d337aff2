// src/logger/format.rs
// Small text formatting helpers shared by the renderers.

use chrono::{DateTime, Local};

/// Timestamp as printed in headers and footers.
pub fn strtime(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S%z").to_string()
}

/// Duration scaled to the largest unit it exceeds: seconds, then minutes
/// once above 60, then hours once that is above 60 again.
pub fn duration_bucketed(seconds: f64) -> (f64, &'static str) {
    let mut value = seconds;
    let mut unit = "seconds";
    if value > 60.0 {
        value /= 60.0;
        unit = "minutes";
    }
    if value > 60.0 {
        value /= 60.0;
        unit = "hours";
    }
    (value, unit)
}

/// "1 hour, 2 minutes, 3 seconds"; sub-second durations keep decimals.
pub fn duration_long(seconds: f64) -> String {
    if seconds < 1.0 {
        return format!("{:.3} seconds", seconds.max(0.0));
    }
    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut pieces = Vec::new();
    for (amount, singular) in [(hours, "hour"), (minutes, "minute"), (secs, "second")] {
        if amount > 0 {
            let plural = if amount == 1 { "" } else { "s" };
            pieces.push(format!("{} {}{}", amount, singular, plural));
        }
    }
    pieces.join(", ")
}

/// Human readable byte size.
pub fn strsize(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for &next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.2}{}", value, unit)
}

/// "1 link" / "2 links"
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}
