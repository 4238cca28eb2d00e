use chrono::NaiveDateTime;

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or empty
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Format a server timestamp for display
pub fn format_datetime(value: Option<NaiveDateTime>) -> String {
    match value {
        Some(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Volunteer hours with at most one decimal place
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}h", hours as i64)
    } else {
        format!("{:.1}h", hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        // Multi-byte characters count once
        assert_eq!(truncate("志愿服务活动报名", 5), "志愿...");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some("Ana"), "-"), "Ana");
        assert_eq!(format_optional(Some(""), "-"), "-");
        assert_eq!(format_optional(None, "n/a"), "n/a");
    }

    #[test]
    fn test_format_datetime() {
        let dt = NaiveDate::from_ymd_opt(2026, 3, 7)
            .and_then(|d| d.and_hms_opt(14, 5, 0));
        assert_eq!(format_datetime(dt), "Mar 07, 2026 14:05");
        assert_eq!(format_datetime(None), "-");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(3.0), "3h");
        assert_eq!(format_hours(2.5), "2.5h");
        assert_eq!(format_hours(2.46), "2.5h");
    }
}
