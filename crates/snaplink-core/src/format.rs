// ── Display helpers ──
//
// Pure formatting shared by front ends. Nothing here touches state.

use chrono::{DateTime, Utc};

/// Cut `text` to `max` characters and append `suffix` if anything was cut.
pub fn truncate_text(text: &str, max: usize, suffix: &str) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str(suffix);
    out
}

/// `1234567` -> `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"1 click"`, `"1,024 clicks"`.
pub fn click_label(count: u64) -> String {
    let noun = if count == 1 { "click" } else { "clicks" };
    format!("{} {noun}", format_count(count))
}

/// `Jun 15, 2024, 10:30 AM`
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Age of `ts` relative to `now`, coarsened for display.
///
/// Under a minute (or in the future) is "Just now"; thirty days and older
/// fall back to a short date.
pub fn relative_time(ts: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*ts);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if elapsed.num_seconds() < 60 {
        "Just now".to_owned()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 30 {
        plural(days, "day")
    } else {
        ts.format("%b %-d").to_string()
    }
}

/// Last-modified column: "Never" for links that were not edited since
/// creation.
pub fn updated_label(created_at: &DateTime<Utc>, updated_at: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    if updated_at == created_at {
        "Never".to_owned()
    } else {
        relative_time(updated_at, now)
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
