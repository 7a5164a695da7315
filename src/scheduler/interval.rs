use std::time::Duration;

/// Longest accepted refresh interval.
pub const MAX_INTERVAL: Duration = Duration::from_secs(30 * 86400);

/// Parse an interval string like "10s", "1m", "2h" or "1d". A bare number
/// is taken as seconds. Intervals above [`MAX_INTERVAL`] are rejected.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    let (digits, unit) = if let Some(n) = s.strip_suffix("ms") {
        (n, 0)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('d') {
        (n, 86400)
    } else {
        (s.as_str(), 1)
    };

    let value = digits
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("Invalid interval: {}. Use format like '10s', '1m', '2h'", s))?;

    let duration = if unit == 0 {
        Some(Duration::from_millis(value))
    } else {
        value.checked_mul(unit).map(Duration::from_secs)
    };

    match duration {
        Some(d) if d.is_zero() => Err(format!("Interval must be positive: {}", s)),
        Some(d) if d <= MAX_INTERVAL => Ok(d),
        _ => Err(format!(
            "Interval too long: {} (at most {})",
            s,
            format_interval(MAX_INTERVAL)
        )),
    }
}

/// Format an interval for display, using the largest whole unit.
pub fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if interval.subsec_millis() != 0 || secs == 0 {
        format!("{}ms", interval.as_millis())
    } else if secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
