//! Clock string codec for transcript timestamps.
//!
//! Transcript panels label segments with `M:SS` or `H:MM:SS`. Parsing is
//! lenient: anything that is not one of those two shapes reads as `0`, so a
//! single corrupt timestamp never aborts a whole transcript.

/// Parse a `M:SS` or `H:MM:SS` clock string into whole seconds.
///
/// Returns 0 for empty or malformed input.
pub fn parse_clock(text: &str) -> u32 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let parts: Option<Vec<u32>> = text
        .split(':')
        .map(|part| part.trim().parse::<u32>().ok())
        .collect();

    match parts.as_deref() {
        Some([minutes, seconds]) => minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(*seconds))
            .unwrap_or(0),
        Some([hours, minutes, seconds]) => hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes.checked_mul(60)?))
            .and_then(|hm| hm.checked_add(*seconds))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Format whole seconds as the shortest canonical clock string.
///
/// `M:SS` under one hour, `H:MM:SS` otherwise.
pub fn format_clock(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format a `start – end` range label
pub fn format_range(start_seconds: u32, end_seconds: u32) -> String {
    format!("{} – {}", format_clock(start_seconds), format_clock(end_seconds))
}
