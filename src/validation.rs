// ✅ Input validation helpers
//
// Shared by the intake form, the field editors and the calculators.

use chrono::Datelike;
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        Regex::new(r"^\(\d{3}\)\d{3}-\d{4}$|^\d{3}-\d{3}-\d{4}$|^\d{10}$").expect("valid phone regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Accepts `(727) 555-0100`, `727-555-0100` or `7275550100`.
/// Whitespace is stripped before matching.
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    phone_regex().is_match(&compact)
}

/// Finite and within `[min, max]`.
pub fn is_in_range(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}

pub fn is_valid_year(year: i32) -> bool {
    let current = chrono::Utc::now().year();
    (1800..=current + 5).contains(&year)
}

/// Round half-up to the nearest integer (2.5 → 3, -2.5 → -2).
pub fn round_half_up(value: f64) -> f64 {
    if (value - value.trunc()).abs() == 0.5 {
        value.floor() + 1.0
    } else {
        value.round()
    }
}

/// Round half-up to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// `315000` → `"315,000"`. Negative values keep their sign.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("agent@example.com"));
        assert!(!is_valid_email("agent@example"));
        assert!(!is_valid_email("agent example@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone_formats() {
        assert!(is_valid_phone("(727) 555-0100"));
        assert!(is_valid_phone("727-555-0100"));
        assert!(is_valid_phone("7275550100"));
        assert!(!is_valid_phone("555-0100"));
        assert!(!is_valid_phone("72755501000"));
    }

    #[test]
    fn test_range_rejects_non_finite() {
        assert!(is_in_range(0.0, 0.0, 30.0));
        assert!(is_in_range(30.0, 0.0, 30.0));
        assert!(!is_in_range(30.01, 0.0, 30.0));
        assert!(!is_in_range(f64::NAN, 0.0, 30.0));
        assert!(!is_in_range(f64::INFINITY, 0.0, f64::INFINITY));
    }

    #[test]
    fn test_year_bounds() {
        assert!(is_valid_year(1972));
        assert!(!is_valid_year(1799));
        assert!(!is_valid_year(chrono::Utc::now().year() + 6));
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2148.49), 2148.0);
        assert_eq!(round_one_decimal(306.61), 306.6);
        assert_eq!(round_one_decimal(0.25), 0.3);
    }

    #[test]
    fn test_rounding_just_below_half() {
        let below_half = 0.49999999999999994;
        assert_eq!(round_half_up(below_half), 0.0, "must not round up below .5");
        assert_eq!(round_half_up(-below_half), 0.0);
        assert_eq!(round_half_up(-3.5), -3.0);
        assert_eq!(round_half_up(4_503_599_627_370_497.0), 4_503_599_627_370_497.0);
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(15520), "15,520");
        assert_eq!(format_thousands(1_000_000), "1,000,000");
        assert_eq!(format_thousands(-7520), "-7,520");
    }
}
