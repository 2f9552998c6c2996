// ✅ Field Validation - format checks run before any uniqueness lookup
// Pure functions: bad input is a result, never an error

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::employee::Field;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern is valid")
});

pub const EMAIL_EXAMPLE: &str = "name@example.com";
pub const DOB_EXAMPLE: &str = "1995-06-15";
pub const DOB_FORMAT: &str = "%Y-%m-%d";
pub const MIN_BIRTH_YEAR: i32 = 1900;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub passed: bool,
    pub field: Field,
    pub message: String,
}

impl ValidationResult {
    pub fn pass(field: Field) -> Self {
        ValidationResult {
            passed: true,
            field,
            message: String::new(),
        }
    }

    pub fn fail(field: Field, message: impl Into<String>) -> Self {
        ValidationResult {
            passed: false,
            field,
            message: message.into(),
        }
    }

    /// Ok(()) when passed, the failed result otherwise
    pub fn into_result(self) -> Result<(), ValidationResult> {
        if self.passed {
            Ok(())
        } else {
            Err(self)
        }
    }
}

// ============================================================================
// EMAIL
// ============================================================================

/// Rules apply in order; the first one that fails is reported.
pub fn validate_email(email: &str) -> ValidationResult {
    // Rule 1: no quotation marks
    if email.contains('\'') || email.contains('"') {
        return ValidationResult::fail(Field::Email, "Email address contains quotation marks.");
    }

    // Rule 2: exactly one '@'
    if email.matches('@').count() != 1 {
        return ValidationResult::fail(Field::Email, "Email address must contain exactly one '@'.");
    }

    // Rule 3: local@domain.tld
    if !EMAIL_RE.is_match(email) {
        return ValidationResult::fail(
            Field::Email,
            format!("Email address has an invalid format (e.g. {}).", EMAIL_EXAMPLE),
        );
    }

    ValidationResult::pass(Field::Email)
}

// ============================================================================
// DATE OF BIRTH
// ============================================================================

/// Validate against today's local date
pub fn validate_dob(dob: &str) -> ValidationResult {
    validate_dob_on(dob, Local::now().date_naive())
}

/// Validate against an explicit reference date.
/// Leap years and day-of-month bounds come from chrono's parser.
pub fn validate_dob_on(dob: &str, today: NaiveDate) -> ValidationResult {
    let wrong_format = || {
        ValidationResult::fail(
            Field::Dob,
            format!("Date of birth is in the wrong format. Use YYYY-MM-DD (e.g. {}).", DOB_EXAMPLE),
        )
    };

    // %Y tolerates a sign and leading whitespace; the year must start with a digit
    if !dob.starts_with(|c: char| c.is_ascii_digit()) {
        return wrong_format();
    }

    let date = match NaiveDate::parse_from_str(dob, DOB_FORMAT) {
        Ok(d) => d,
        Err(_) => return wrong_format(),
    };

    if date > today {
        return ValidationResult::fail(Field::Dob, "Date of birth cannot be in the future.");
    }

    if date.year() < MIN_BIRTH_YEAR {
        return ValidationResult::fail(
            Field::Dob,
            format!("Date of birth year must be {} or later.", MIN_BIRTH_YEAR),
        );
    }

    ValidationResult::pass(Field::Dob)
}

// ============================================================================
// PHONE
// ============================================================================

/// 10 or 11 ASCII digits, nothing else. Separators are not stripped.
pub fn validate_phone(contact: &str) -> ValidationResult {
    if !contact.chars().all(|c| c.is_ascii_digit()) {
        return ValidationResult::fail(Field::Contact, "Phone number must contain digits only.");
    }

    if !(10..=11).contains(&contact.len()) {
        return ValidationResult::fail(Field::Contact, "Phone number must be 10 or 11 digits long.");
    }

    ValidationResult::pass(Field::Contact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_email_accepts_plain_address() {
        assert!(validate_email("a@b.com").passed);
        assert!(validate_email("juan.dela-cruz_2@mail.example.ph").passed);
    }

    #[test]
    fn test_email_rejects_quotes_first() {
        for email in ["o'neil@b.com", "\"a\"@b.com", "a@@b'.com"] {
            let result = validate_email(email);
            assert!(!result.passed, "{} should be rejected", email);
            assert!(result.message.contains("quotation marks"));
        }
    }

    #[test]
    fn test_email_at_sign_count() {
        let result = validate_email("a@@b.com");
        assert!(!result.passed);
        assert!(result.message.contains("exactly one '@'"));

        let result = validate_email("ab.com");
        assert!(!result.passed);
        assert!(result.message.contains("exactly one '@'"));
    }

    #[test]
    fn test_email_requires_tld_of_two_letters() {
        for email in ["a@b", "a@b.c", "a@b.c0m", "a b@c.com"] {
            let result = validate_email(email);
            assert!(!result.passed, "{} should be rejected", email);
            assert!(result.message.contains("invalid format"));
            assert!(result.message.contains(EMAIL_EXAMPLE));
        }
    }

    #[test]
    fn test_dob_accepts_past_date() {
        assert!(validate_dob_on("1995-06-15", day(2026, 10, 17)).passed);
        assert!(validate_dob_on("1900-01-01", day(2026, 10, 17)).passed);
    }

    #[test]
    fn test_dob_today_is_not_future() {
        assert!(validate_dob_on("2026-10-17", day(2026, 10, 17)).passed);
        assert!(!validate_dob_on("2026-10-18", day(2026, 10, 17)).passed);
    }

    #[test]
    fn test_dob_rejects_future() {
        let result = validate_dob("2099-01-01");
        assert!(!result.passed);
        assert!(result.message.contains("cannot be in the future"));
    }

    #[test]
    fn test_dob_rejects_before_1900() {
        let result = validate_dob_on("1899-12-31", day(2026, 10, 17));
        assert!(!result.passed);
        assert!(result.message.contains("1900 or later"));
    }

    #[test]
    fn test_dob_rejects_bad_calendar_dates() {
        for dob in [
            "1995-13-40",
            "2023-02-29",
            "15/06/1995",
            "1995-06-15T00:00",
            "",
            "+1995-06-15",
            "-1995-06-15",
            " 1995-06-15",
        ] {
            let result = validate_dob_on(dob, day(2026, 10, 17));
            assert!(!result.passed, "{} should be rejected", dob);
            assert!(result.message.contains("wrong format"));
            assert!(result.message.contains(DOB_EXAMPLE));
        }
        // leap day in a leap year is fine
        assert!(validate_dob_on("2024-02-29", day(2026, 10, 17)).passed);
    }

    #[test]
    fn test_phone_lengths() {
        assert!(!validate_phone("12345").passed);
        assert!(validate_phone("1234567890").passed);
        assert!(validate_phone("09171234567").passed);
        assert!(!validate_phone("123456789012").passed);
    }

    #[test]
    fn test_phone_rejects_separators() {
        for phone in ["123-456-7890", "(123)4567890", "+639171234567", "123 456 7890", ""] {
            assert!(!validate_phone(phone).passed, "{} should be rejected", phone);
        }
    }

    #[test]
    fn test_phone_empty_reports_length() {
        let result = validate_phone("");
        assert!(!result.passed);
        assert!(result.message.contains("10 or 11 digits"));
    }

    #[test]
    fn test_phone_rejects_non_ascii_digits() {
        // Arabic-Indic digits are numeric but not ASCII
        assert!(!validate_phone("٠١٢٣٤٥٦٧٨٩").passed);
    }

    #[test]
    fn test_into_result() {
        assert!(validate_phone("1234567890").into_result().is_ok());
        let err = validate_phone("12").into_result().unwrap_err();
        assert_eq!(err.field, Field::Contact);
    }
}
