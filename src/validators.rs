//! Typed field validators
//!
//! Each validator is a total function: malformed input is a normal `Err`
//! outcome, never a panic. On success the validator returns the sanitized or
//! parsed value; on failure a [`FieldFailure`] with a human-readable message
//! and, for policy failures, remediation suggestions.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::sanitizers::strip_phone_separators;

lazy_static! {
    /// Simplified RFC 5322 email pattern
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();

    /// Injection markers that disqualify an email outright
    static ref EMAIL_SUSPICIOUS: Regex =
        Regex::new(r"(?i)(javascript:|<script|on\w+=|\.\.|%00|\\x)").unwrap();

    /// Username shape: alphanumeric plus underscore/hyphen, 3-30 chars
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]{3,30}$").unwrap();

    /// E.164-ish phone shape after separators are stripped
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?\d{10,15}$").unwrap();

    /// Literal YYYY-MM-DD shape
    static ref DATE_REGEX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();

    /// Windows drive-letter prefix (C:, d:, ...)
    static ref WINDOWS_DRIVE: Regex = Regex::new(r"^[a-zA-Z]:").unwrap();

    /// Anything outside the file-path whitelist
    static ref PATH_DISALLOWED: Regex = Regex::new(r"[^\w\s\-./]").unwrap();
}

/// Usernames that are never assignable regardless of shape, compared
/// case-insensitively. Includes SQL keywords that show up in probe traffic.
const RESERVED_USERNAMES: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "superuser",
    "moderator",
    "support",
    "librarian",
    "guest",
    "test",
    "user",
    "null",
    "undefined",
    "drop",
    "select",
    "insert",
    "update",
    "delete",
    "truncate",
    "exec",
];

/// Substrings that mark a password as too common, matched against the
/// lowercased password.
const COMMON_PASSWORDS: &[&str] = &[
    "123456",
    "password",
    "qwerty",
    "abc123",
    "letmein",
    "welcome",
    "iloveyou",
    "monkey",
    "dragon",
    "111111",
    "baseball",
    "football",
];

/// Maximum email length per RFC 5321
const MAX_EMAIL_LENGTH: usize = 254;
/// Minimum password length
const MIN_PASSWORD_LENGTH: usize = 8;
/// Complexity score a password must reach
const MIN_PASSWORD_SCORE: u32 = 3;
/// Earliest year accepted by [`validate_date`]
const MIN_DATE_YEAR: i32 = 1900;
/// Latest year accepted by [`validate_date`]
const MAX_DATE_YEAR: i32 = 2100;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub message: String,
    pub suggestions: Vec<String>,
}

impl FieldFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: vec![],
        }
    }

    pub fn with_suggestions(message: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            message: message.into(),
            suggestions,
        }
    }
}

/// Validate and normalize an email address: trims, lowercases, checks the
/// simplified RFC 5322 shape, the 254-character limit, and injection markers.
pub fn validate_email(raw: &str) -> Result<String, FieldFailure> {
    let normalized = raw.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(FieldFailure::new("Email is required"));
    }
    if normalized.chars().count() > MAX_EMAIL_LENGTH {
        return Err(FieldFailure::new(format!(
            "Email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }
    if EMAIL_SUSPICIOUS.is_match(&normalized) {
        return Err(FieldFailure::new("Email contains disallowed content"));
    }
    if !EMAIL_REGEX.is_match(&normalized) {
        return Err(FieldFailure::new("Must be a valid email address"));
    }

    Ok(normalized)
}

/// Validate a username: 3-30 chars of `[a-zA-Z0-9_-]`, no leading/trailing
/// underscore or hyphen, and not on the reserved-word blocklist.
pub fn validate_username(raw: &str) -> Result<String, FieldFailure> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(FieldFailure::new("Username is required"));
    }
    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(FieldFailure::new(
            "Username must be 3-30 characters of letters, digits, underscores or hyphens",
        ));
    }
    if trimmed.starts_with(['_', '-']) || trimmed.ends_with(['_', '-']) {
        return Err(FieldFailure::new(
            "Username must not start or end with an underscore or hyphen",
        ));
    }
    let lower = trimmed.to_lowercase();
    if RESERVED_USERNAMES.contains(&lower.as_str()) {
        return Err(FieldFailure::new("This username is reserved"));
    }

    Ok(trimmed.to_string())
}

/// Validate password strength.
///
/// Score = number of character classes present (lowercase, uppercase, digit,
/// special), +1 at 12 characters and +1 at 16. A password is accepted when it
/// is at least 8 characters, scores 3 or more, and contains no common
/// password fragment. The password itself is never normalized.
pub fn validate_password(raw: &str) -> Result<(), FieldFailure> {
    let length = raw.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(FieldFailure::with_suggestions(
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            vec![format!("Use at least {MIN_PASSWORD_LENGTH} characters")],
        ));
    }

    let lower = raw.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|p| lower.contains(p)) {
        return Err(FieldFailure::with_suggestions(
            "Password is too common",
            vec!["Avoid dictionary words and common sequences".to_string()],
        ));
    }

    let has_lower = raw.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = raw.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    let has_special = raw.chars().any(|c| !c.is_alphanumeric());

    let mut score = [has_lower, has_upper, has_digit, has_special]
        .iter()
        .filter(|present| **present)
        .count() as u32;
    if length >= 12 {
        score += 1;
    }
    if length >= 16 {
        score += 1;
    }

    if score < MIN_PASSWORD_SCORE {
        let mut suggestions = Vec::new();
        if !has_lower {
            suggestions.push("Add lowercase letters".to_string());
        }
        if !has_upper {
            suggestions.push("Add uppercase letters".to_string());
        }
        if !has_digit {
            suggestions.push("Add digits".to_string());
        }
        if !has_special {
            suggestions.push("Add special characters".to_string());
        }
        return Err(FieldFailure::with_suggestions(
            "Password is too weak",
            suggestions,
        ));
    }

    Ok(())
}

/// Validate an optional phone number. Absence (or an empty string) is valid
/// with a `None` value; when present, separators ` -().` are stripped and the
/// remainder must be 10-15 digits with an optional leading `+`.
pub fn validate_phone(raw: Option<&str>) -> Result<Option<String>, FieldFailure> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let stripped = strip_phone_separators(raw.trim());
    if !PHONE_REGEX.is_match(&stripped) {
        return Err(FieldFailure::new(
            "Phone number must contain 10-15 digits",
        ));
    }

    Ok(Some(stripped))
}

/// Parse a base-10 integer and check it against optional bounds.
pub fn validate_integer(
    raw: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<i64, FieldFailure> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| FieldFailure::new("Must be a whole number"))?;
    check_integer_bounds(value, min, max)?;
    Ok(value)
}

/// Bounds check shared by the string and native-number integer paths.
pub fn check_integer_bounds(
    value: i64,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<i64, FieldFailure> {
    if let Some(min) = min {
        if value < min {
            return Err(FieldFailure::new(format!("Must be at least {min}")));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(FieldFailure::new(format!("Must be at most {max}")));
        }
    }
    Ok(value)
}

/// Parse a decimal number, check bounds, then round to `decimals` places
/// (multiply-round-divide, half away from zero).
pub fn validate_decimal(
    raw: &str,
    min: Option<f64>,
    max: Option<f64>,
    decimals: Option<u32>,
) -> Result<f64, FieldFailure> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| FieldFailure::new("Must be a number"))?;
    check_decimal_bounds(value, min, max, decimals)
}

/// Bounds check and rounding shared by the string and native-number paths.
pub fn check_decimal_bounds(
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
    decimals: Option<u32>,
) -> Result<f64, FieldFailure> {
    if !value.is_finite() {
        return Err(FieldFailure::new("Must be a finite number"));
    }
    if let Some(min) = min {
        if value < min {
            return Err(FieldFailure::new(format!("Must be at least {min}")));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(FieldFailure::new(format!("Must be at most {max}")));
        }
    }
    let rounded = match decimals {
        Some(places) => {
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        }
        None => value,
    };
    Ok(rounded)
}

/// Validate a `YYYY-MM-DD` date: literal shape, real calendar date, and a
/// year between 1900 and 2100.
pub fn validate_date(raw: &str) -> Result<NaiveDate, FieldFailure> {
    let trimmed = raw.trim();

    if !DATE_REGEX.is_match(trimmed) {
        return Err(FieldFailure::new("Must be in YYYY-MM-DD format"));
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| FieldFailure::new("Must be a valid calendar date"))?;
    if date.year() < MIN_DATE_YEAR || date.year() > MAX_DATE_YEAR {
        return Err(FieldFailure::new(format!(
            "Year must be between {MIN_DATE_YEAR} and {MAX_DATE_YEAR}"
        )));
    }

    Ok(date)
}

/// Validate membership in an allowed-values list.
pub fn validate_enum(raw: &str, allowed: &[String]) -> Result<String, FieldFailure> {
    if allowed.iter().any(|a| a == raw) {
        Ok(raw.to_string())
    } else {
        Err(FieldFailure::new(format!(
            "Must be one of: {}",
            allowed.join(", ")
        )))
    }
}

/// Validate that a string parses as strict JSON, returning the parsed value.
pub fn validate_json(raw: &str) -> Result<serde_json::Value, FieldFailure> {
    serde_json::from_str(raw).map_err(|_| FieldFailure::new("Must be valid JSON"))
}

/// Validate a relative file path: rejects traversal (`..`), absolute unix and
/// windows paths, home-directory references and null bytes, then strips the
/// remainder to `[\w\s\-./]`.
pub fn validate_file_path(raw: &str) -> Result<String, FieldFailure> {
    if raw.contains("..")
        || raw.starts_with('/')
        || raw.starts_with('\\')
        || WINDOWS_DRIVE.is_match(raw)
        || raw.contains('~')
        || raw.contains('\0')
        || raw.contains("%00")
    {
        return Err(FieldFailure::new("Path contains disallowed sequences"));
    }

    Ok(PATH_DISALLOWED.replace_all(raw, "").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_normalizes() {
        assert_eq!(validate_email("USER@Example.COM").unwrap(), "user@example.com");
        assert_eq!(validate_email("  a@b.com  ").unwrap(), "a@b.com");
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_email_rejects_suspicious() {
        assert!(validate_email("javascript:alert@x.com").is_err());
        assert!(validate_email("a<script@b.com").is_err());
        assert!(validate_email("a..b@example.com").is_err());
        assert!(validate_email("a%00b@example.com").is_err());
    }

    #[test]
    fn test_validate_email_rejects_overlong() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("abc123").unwrap(), "abc123");
        assert_eq!(validate_username("  john_doe  ").unwrap(), "john_doe");

        assert!(validate_username("ab").is_err()); // too short
        assert!(validate_username("_abc").is_err()); // leading underscore
        assert!(validate_username("abc-").is_err()); // trailing hyphen
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_validate_username_reserved() {
        assert!(validate_username("admin").is_err());
        assert!(validate_username("ADMIN").is_err());
        assert!(validate_username("Select").is_err());
        assert!(validate_username("librarian").is_err());
    }

    #[test]
    fn test_validate_password_common_rejected_regardless_of_score() {
        let err = validate_password("password123").unwrap_err();
        assert!(err.message.contains("common"));
        assert!(validate_password("Qwerty!2345678").is_err());
    }

    #[test]
    fn test_validate_password_too_short() {
        let err = validate_password("Ab1!x").unwrap_err();
        assert!(err.message.contains("at least 8"));
        assert!(!err.suggestions.is_empty());
    }

    #[test]
    fn test_validate_password_accepts_strong() {
        assert!(validate_password("Tr0ub4dor&3xyz").is_ok());
        assert!(validate_password("correct-HORSE-battery-9").is_ok());
    }

    #[test]
    fn test_validate_password_weak_gets_suggestions() {
        let err = validate_password("aaaabbbb").unwrap_err();
        assert!(err.message.contains("weak"));
        assert!(err.suggestions.iter().any(|s| s.contains("uppercase")));
        assert!(err.suggestions.iter().any(|s| s.contains("digits")));
    }

    #[test]
    fn test_validate_phone_optional() {
        assert_eq!(validate_phone(None).unwrap(), None);
        assert_eq!(validate_phone(Some("")).unwrap(), None);
        assert_eq!(validate_phone(Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_validate_phone_strips_separators() {
        assert_eq!(
            validate_phone(Some("(555) 123-4567")).unwrap(),
            Some("5551234567".to_string())
        );
        assert_eq!(
            validate_phone(Some("+1.555.123.4567")).unwrap(),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_validate_phone_digit_count() {
        assert!(validate_phone(Some("123456789")).is_err()); // 9 digits
        assert!(validate_phone(Some("1234567890123456")).is_err()); // 16 digits
        assert!(validate_phone(Some("555-CALL-NOW")).is_err());
    }

    #[test]
    fn test_validate_integer() {
        assert_eq!(validate_integer("42", None, None).unwrap(), 42);
        assert_eq!(validate_integer(" -3 ", Some(-10), Some(10)).unwrap(), -3);

        assert!(validate_integer("7", Some(1), Some(5)).is_err());
        assert!(validate_integer("0", Some(1), None).is_err());
        assert!(validate_integer("abc", None, None).is_err());
        assert!(validate_integer("1.5", None, None).is_err());
    }

    #[test]
    fn test_validate_integer_bound_messages() {
        let err = validate_integer("200", Some(0), Some(120)).unwrap_err();
        assert_eq!(err.message, "Must be at most 120");
        let err = validate_integer("-1", Some(0), Some(120)).unwrap_err();
        assert_eq!(err.message, "Must be at least 0");
    }

    #[test]
    fn test_validate_decimal_rounding() {
        let value = validate_decimal("19.999", None, None, Some(2)).unwrap();
        assert!((value - 20.00).abs() < f64::EPSILON);

        let value = validate_decimal("3.14159", None, None, Some(3)).unwrap();
        assert!((value - 3.142).abs() < 1e-9);
    }

    #[test]
    fn test_validate_decimal_bounds() {
        assert!(validate_decimal("5.5", Some(0.0), Some(5.0), None).is_err());
        assert!(validate_decimal("not-a-number", None, None, None).is_err());
        assert!(validate_decimal("NaN", None, None, None).is_err());
    }

    #[test]
    fn test_validate_date() {
        let date = validate_date("2024-06-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());

        assert!(validate_date("2024-02-30").is_err()); // calendar-invalid
        assert!(validate_date("15-06-2024").is_err()); // wrong shape
        assert!(validate_date("2024/06/15").is_err());
        assert!(validate_date("1899-12-31").is_err()); // year too early
        assert!(validate_date("2101-01-01").is_err()); // year too late
    }

    #[test]
    fn test_validate_enum() {
        let allowed = vec!["book".to_string(), "cd".to_string(), "movie".to_string()];
        assert_eq!(validate_enum("cd", &allowed).unwrap(), "cd");

        let err = validate_enum("vinyl", &allowed).unwrap_err();
        assert!(err.message.contains("book, cd, movie"));
    }

    #[test]
    fn test_validate_json() {
        assert!(validate_json(r#"{"a": 1}"#).is_ok());
        assert!(validate_json("[1, 2, 3]").is_ok());
        assert!(validate_json("{not json}").is_err());
        assert!(validate_json("").is_err());
    }

    #[test]
    fn test_validate_file_path() {
        assert_eq!(
            validate_file_path("covers/book-42.jpg").unwrap(),
            "covers/book-42.jpg"
        );

        assert!(validate_file_path("../../etc/passwd").is_err());
        assert!(validate_file_path("/etc/passwd").is_err());
        assert!(validate_file_path(r"\\server\share").is_err());
        assert!(validate_file_path("C:\\windows").is_err());
        assert!(validate_file_path("~/secrets").is_err());
        assert!(validate_file_path("a%00.jpg").is_err());
    }

    #[test]
    fn test_validate_file_path_strips_disallowed() {
        assert_eq!(validate_file_path("a<b>;c.png").unwrap(), "abc.png");
    }
}
