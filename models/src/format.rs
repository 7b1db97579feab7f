use std::time::Duration;

pub fn format_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn format_float(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

/// Whole milliseconds are printed without decimals.
pub fn format_milliseconds(value: Option<f64>) -> String {
    match value {
        Some(v) if (v - v.round()).abs() <= 0.005 => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

pub fn format_bool(value: Option<bool>) -> String {
    match value {
        Some(true) => "on".to_string(),
        Some(false) => "off".to_string(),
        None => "-".to_string(),
    }
}

/// Formats an uptime like `1 day, 2 hours, 3 minutes`.
pub fn format_duration(value: Option<Duration>) -> String {
    let Some(duration) = value.filter(|d| !d.is_zero()) else {
        return "-".to_string();
    };

    let total_minutes = duration.as_secs() / 60;
    let minutes = total_minutes % 60;
    let hours = (total_minutes / 60) % 24;
    let days = total_minutes / 60 / 24;

    let mut parts = Vec::with_capacity(3);

    match days {
        0 => {}
        1 => parts.push("1 day".to_string()),
        n => parts.push(format!("{n} days")),
    }

    if hours == 1 {
        parts.push("1 hour".to_string());
    } else if days > 0 || hours > 1 {
        parts.push(format!("{hours} hours"));
    }

    if minutes == 1 {
        parts.push("1 minute".to_string());
    } else {
        parts.push(format!("{minutes} minutes"));
    }

    parts.join(", ")
}
