use std::cmp::Ordering;

/// Format a points total for display: whole numbers without the trailing
/// ".0", half points (sprint-era scoring) with one decimal.
pub fn format_points(points: Option<f64>) -> String {
    match points {
        Some(p) if (p - p.trunc()).abs() < f64::EPSILON => format!("{}", p as i64),
        Some(p) => format!("{:.1}", p),
        None => "-".to_string(),
    }
}

/// Format a championship or race position as "P1", "P2", ...
pub fn format_position(position: Option<i64>) -> String {
    match position {
        Some(p) => format!("P{}", p),
        None => "-".to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    // Try to parse ISO format and convert to readable
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Case-insensitive substring match for search
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive comparison for sorting
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(Some(183.0)), "183");
        assert_eq!(format_points(Some(44.5)), "44.5");
        assert_eq!(format_points(None), "-");
    }

    #[test]
    fn test_format_position() {
        assert_eq!(format_position(Some(1)), "P1");
        assert_eq!(format_position(None), "-");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("1999-11-13"), "Nov 13, 1999");
        assert_eq!(format_date("2026-03-01T10:00:00Z"), "Mar 01, 2026");
        assert_eq!(format_date("tbd"), "tbd");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Lando Norris", "norris"));
        assert!(!contains_ignore_case("Lando Norris", "piastri"));
    }
}
