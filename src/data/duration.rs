//! Human-readable durations for configuration and the status bar.

use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to milliseconds multiplier (longer suffixes first so "ms" wins over "s")
const UNITS: &[(&str, f64)] = &[
    ("ms", 1.0),
    ("s", 1_000.0),
    ("m", 60_000.0),
    ("h", 3_600_000.0),
];

/// Parse duration strings like "30s", "800ms", "2m", "1.5h".
///
/// A bare number is read as seconds, matching the `--refresh` flag.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        bail!("Empty duration");
    }

    if let Ok(secs) = s.parse::<f64>() {
        return to_duration(secs * 1_000.0, s);
    }

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            return to_duration(val * multiplier, s);
        }
    }

    bail!("Unknown duration format: {}", s)
}

fn to_duration(millis: f64, raw: &str) -> Result<Duration> {
    if !millis.is_finite() || millis < 0.0 {
        bail!("Duration out of range: {}", raw);
    }
    Ok(Duration::from_micros((millis * 1_000.0) as u64))
}

/// Format an elapsed time for the "Updated ... ago" label.
pub fn format_ago(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 1 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3_600 {
        format!("{}m {}s ago", secs / 60, secs % 60)
    } else {
        format!("{}h {}m ago", secs / 3_600, (secs % 3_600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2.5s").unwrap(), Duration::from_millis(2_500));
    }

    #[test]
    fn test_parse_milliseconds() {
        assert_eq!(parse_duration("800ms").unwrap(), Duration::from_millis(800));
    }

    #[test]
    fn test_parse_minutes_and_hours() {
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("6h").unwrap(), Duration::from_secs(6 * 3_600));
    }

    #[test]
    fn test_bare_number_is_seconds() {
        assert_eq!(parse_duration("15").unwrap(), Duration::from_secs(15));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn test_format_ago() {
        assert_eq!(format_ago(Duration::from_millis(300)), "just now");
        assert_eq!(format_ago(Duration::from_secs(42)), "42s ago");
        assert_eq!(format_ago(Duration::from_secs(125)), "2m 5s ago");
        assert_eq!(format_ago(Duration::from_secs(3_700)), "1h 1m ago");
    }
}
