//! Helpdesk duration strings
//!
//! The metrics endpoint reports durations as free text: `"20 days 04:40 hrs"`,
//! `"04:40 hrs"`, or a bare number of hours. Two parsers coexist because
//! averaging code needs to tell "recorded as zero" apart from "not recorded".

use regex::Regex;
use std::sync::LazyLock;

static DAYS_AND_CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*days?\s+(\d{1,2}):(\d{2})\s*hrs?").expect("static duration pattern")
});

static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})\s*hrs?").expect("static duration pattern"));

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("static duration pattern"));

static STRICT_CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+):(\d{2})\s*hrs$").expect("static duration pattern")
});

fn capture_number(caps: &regex::Captures<'_>, index: usize) -> f64 {
    caps.get(index)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Lenient parse into hours. Anything unrecognised is `0.0`.
pub fn parse_duration_hours(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else { return 0.0 };
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return 0.0;
    }

    if let Some(caps) = DAYS_AND_CLOCK.captures(&text) {
        let days = capture_number(&caps, 1);
        let hours = capture_number(&caps, 2);
        let minutes = capture_number(&caps, 3);
        return days * 24.0 + hours + minutes / 60.0;
    }

    if let Some(caps) = CLOCK.captures(&text) {
        return capture_number(&caps, 1) + capture_number(&caps, 2) / 60.0;
    }

    BARE_NUMBER
        .captures(&text)
        .map(|caps| capture_number(&caps, 1))
        .unwrap_or(0.0)
}

/// Strict `"H:MM hrs"` parse into minutes; `None` when absent or malformed.
pub fn hrs_to_minutes(raw: Option<&str>) -> Option<u64> {
    let caps = STRICT_CLOCK.captures(raw?.trim())?;
    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// `"H:MM hrs"` to `"H:MM"`; other non-empty input is returned untouched.
pub fn hrs_to_hm(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(text) if text.is_empty() => String::new(),
        Some(text) => match hrs_to_minutes(Some(text)) {
            Some(minutes) => minutes_to_hm(minutes),
            None => text.to_string(),
        },
    }
}

pub fn minutes_to_hm(total_minutes: u64) -> String {
    format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
}

pub fn minutes_to_days_label(total_minutes: u64) -> String {
    format!("{} Days", total_minutes / (60 * 24))
}

/// Fractional hours rendered as `"H:MM"`, rounded to the nearest minute.
pub fn hours_to_hm(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return minutes_to_hm(0);
    }
    minutes_to_hm((hours * 60.0).round() as u64)
}
