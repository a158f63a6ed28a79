use chrono::{DateTime, Local};

/// Format an Uzbek phone number for display.
/// Normalizes 998XXXXXXXXX (or the 9-digit local part) to +998 (XX) XXX-XX-XX.
pub fn format_uz_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = match digits.len() {
        12 if digits.starts_with("998") => &digits[3..],
        9 => digits.as_str(),
        _ => return phone.to_string(), // Return original if can't format
    };

    format!(
        "+998 ({}) {}-{}-{}",
        &local[0..2],
        &local[2..5],
        &local[5..7],
        &local[7..9]
    )
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

fn parse_local(timestamp: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

/// Format an ISO timestamp as a date (DD.MM.YYYY), in local time.
pub fn format_date(timestamp: &str) -> String {
    match parse_local(timestamp) {
        Some(dt) => dt.format("%d.%m.%Y").to_string(),
        None if timestamp.len() >= 10 => timestamp.chars().take(10).collect(),
        None => timestamp.to_string(),
    }
}

/// Format an ISO timestamp as a time of day (HH:MM), in local time.
pub fn format_time(timestamp: &str) -> String {
    parse_local(timestamp)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uz_phone() {
        assert_eq!(format_uz_phone("998901234567"), "+998 (90) 123-45-67");
        assert_eq!(format_uz_phone("+998 90 123 45 67"), "+998 (90) 123-45-67");
        assert_eq!(format_uz_phone("901234567"), "+998 (90) 123-45-67");
        assert_eq!(format_uz_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("O'zbekiston", 5), "O'...");
    }

    #[test]
    fn test_format_date_fallbacks() {
        assert_eq!(format_date("2024-03-05"), "2024-03-05");
        assert_eq!(format_date("bad"), "bad");
        assert_eq!(format_time("bad"), "");
    }

    #[test]
    fn test_format_date_and_time_parse_rfc3339() {
        let date = format_date("2024-03-05T10:15:00Z");
        assert_eq!(date.len(), 10);
        assert_eq!(date.matches('.').count(), 2);
        assert_eq!(format_time("2024-03-05T10:15:00Z").len(), 5);
    }
}
