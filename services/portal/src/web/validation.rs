//! services/portal/src/web/validation.rs
//!
//! Field checks shared by the public and admin forms.

use regex::Regex;
use spa_portal_core::domain::FieldErrors;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// At least seven digits, ignoring spaces, dashes, dots, parentheses and a leading `+`.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let allowed = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || " -.()".contains(c) || (i == 0 && c == '+'));
    allowed && phone.chars().filter(char::is_ascii_digit).count() >= 7
}

pub fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, message);
        false
    } else {
        true
    }
}

pub fn require_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if require(errors, field, value, "Email is required") && !is_valid_email(value) {
        errors.insert(field, "Please enter a valid email address");
    }
}
