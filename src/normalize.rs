//! Input normalization shared by the stores and the report.
//!
//! Guests submit loosely typed data. Every coercion lives here with a fixed
//! fallback so that the stores only ever see normalized values.

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::error::AppError;
use crate::models::response::Attendance;

/// Trimmed value of a required text field; missing or blank is a validation error.
pub fn required_text(field: &'static str, value: Option<&str>) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::validation(field, format!("{field} is required"))),
    }
}

/// Trimmed value of an optional text field; blank becomes `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trimmed text that is allowed to be empty.
pub fn lenient_text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Case-insensitive attendance parse.
pub fn parse_attendance(value: Option<&str>) -> Result<Attendance, AppError> {
    let raw = value.map(str::trim).unwrap_or_default();
    match raw.to_ascii_lowercase().as_str() {
        "yes" => Ok(Attendance::Yes),
        "no" => Ok(Attendance::No),
        "maybe" => Ok(Attendance::Maybe),
        "" => Err(AppError::validation("attendance", "attendance is required")),
        other => Err(AppError::validation(
            "attendance",
            format!("attendance must be one of yes, no, maybe (got {other:?})"),
        )),
    }
}

/// Largest party a single response may claim.
pub const MAX_GUEST_COUNT: i64 = 1000;

/// Coerce a loosely typed guest count. Numbers and numeric strings are truncated
/// toward zero; anything else, or any result below 1, becomes 1. Results above
/// [`MAX_GUEST_COUNT`] are capped.
pub fn coerce_guest_count(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(truncate)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(truncate))
        }
        _ => None,
    };
    clamp_guest_count(parsed.unwrap_or(1))
}

fn truncate(f: f64) -> i64 {
    if f.is_finite() {
        f.trunc() as i64
    } else {
        1
    }
}

/// Stored counts are clamped again at read time; older records may predate validation.
pub fn clamp_guest_count(count: i64) -> i64 {
    count.clamp(1, MAX_GUEST_COUNT)
}

/// Trim and lowercase tags, drop blanks and keep the first occurrence of each.
pub fn normalize_dietary(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(field, format!("{field} must be a YYYY-MM-DD date")))
}

/// Validates `HH:MM` and returns it zero-padded.
pub fn parse_time(field: &'static str, value: &str) -> Result<String, AppError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| AppError::validation(field, format!("{field} must be an HH:MM time")))
}

pub fn check_utc_offset(minutes: i32) -> Result<i32, AppError> {
    if (-840..=840).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(AppError::validation(
            "utc_offset_minutes",
            "utc_offset_minutes must be between -840 and 840",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("guest_name", Some("  Amy ")).unwrap(), "Amy");
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let err = required_text("guest_email", Some("   ")).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "guest_email", .. }));
        assert!(required_text("guest_email", None).is_err());
    }

    #[test]
    fn test_attendance_case_insensitive() {
        assert_eq!(parse_attendance(Some("YES")).unwrap(), Attendance::Yes);
        assert_eq!(parse_attendance(Some(" Maybe ")).unwrap(), Attendance::Maybe);
        assert_eq!(parse_attendance(Some("no")).unwrap(), Attendance::No);
    }

    #[test]
    fn test_attendance_invalid_names_field() {
        let err = parse_attendance(Some("perhaps")).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "attendance", .. }));
    }

    #[test]
    fn test_guest_count_coercion() {
        assert_eq!(coerce_guest_count(Some(&json!(3))), 3);
        assert_eq!(coerce_guest_count(Some(&json!("4"))), 4);
        assert_eq!(coerce_guest_count(Some(&json!(" 2 "))), 2);
        assert_eq!(coerce_guest_count(Some(&json!(2.9))), 2);
        assert_eq!(coerce_guest_count(Some(&json!("abc"))), 1);
        assert_eq!(coerce_guest_count(Some(&json!(0))), 1);
        assert_eq!(coerce_guest_count(Some(&json!(-5))), 1);
        assert_eq!(coerce_guest_count(Some(&json!(null))), 1);
        assert_eq!(coerce_guest_count(Some(&json!(true))), 1);
        assert_eq!(coerce_guest_count(None), 1);
    }

    #[test]
    fn test_guest_count_upper_bound() {
        assert_eq!(coerce_guest_count(Some(&json!("1e30"))), MAX_GUEST_COUNT);
        assert_eq!(coerce_guest_count(Some(&json!(1e300))), MAX_GUEST_COUNT);
        assert_eq!(coerce_guest_count(Some(&json!(i64::MAX))), MAX_GUEST_COUNT);
        assert_eq!(coerce_guest_count(Some(&json!(MAX_GUEST_COUNT))), MAX_GUEST_COUNT);
        assert_eq!(clamp_guest_count(i64::MAX), MAX_GUEST_COUNT);
        assert_eq!(clamp_guest_count(i64::MIN), 1);
    }

    #[test]
    fn test_dietary_normalization() {
        let tags = vec![
            " Vegan".to_string(),
            "gluten-free".to_string(),
            "".to_string(),
            "VEGAN".to_string(),
        ];
        assert_eq!(normalize_dietary(&tags), vec!["vegan", "gluten-free"]);
    }

    #[test]
    fn test_parse_time_pads() {
        assert_eq!(parse_time("time", "9:05").unwrap(), "09:05");
        assert!(parse_time("time", "25:00").is_err());
    }

    #[test]
    fn test_utc_offset_bounds() {
        assert!(check_utc_offset(-840).is_ok());
        assert!(check_utc_offset(841).is_err());
    }
}
