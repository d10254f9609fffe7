//! Per-field input validators.
//!
//! Every validator trims and sanitizes its input and returns the sanitized
//! value, or a `Validation` error whose message names the field. A field
//! that sanitizes down to an empty string is an error, never silently empty.

use crate::constants::{MAX_EMAIL_LEN, MAX_MESSAGE_LEN, MAX_NAME_LEN, MAX_SUBJECT_LEN};
use crate::error::{CoreError, Result};

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::Validation(msg.into())
}

/// Email address: trimmed, lowercased, one `@`, dotted domain.
pub fn email(raw: &str) -> Result<String> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err(invalid("email is required"));
    }
    if value.len() > MAX_EMAIL_LEN {
        return Err(invalid("email is too long"));
    }
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid("email must contain a single @"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("email domain is not valid"));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid("email contains invalid characters"));
    }
    Ok(value)
}

/// Password: 8..=128 chars, at least one letter and one digit.
pub fn password(raw: &str) -> Result<String> {
    if raw.len() < 8 {
        return Err(invalid("password must be at least 8 characters"));
    }
    if raw.len() > 128 {
        return Err(invalid("password must be at most 128 characters"));
    }
    if !raw.chars().any(|c| c.is_ascii_alphabetic()) || !raw.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("password must contain a letter and a digit"));
    }
    Ok(raw.to_string())
}

/// Person name: trimmed, bounded, no control characters or angle brackets.
pub fn person_name(field: &str, raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(invalid(format!("{field} is too long")));
    }
    if value.chars().any(|c| c.is_control() || c == '<' || c == '>') {
        return Err(invalid(format!("{field} contains invalid characters")));
    }
    Ok(value.to_string())
}

/// Phone number: optional leading `+`, digits with spaces and dashes,
/// 7..=20 digits total.
pub fn phone(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid("phone is required"));
    }
    let rest = value.strip_prefix('+').unwrap_or(value);
    if !rest
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err(invalid("phone contains invalid characters"));
    }
    let digits = rest.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=20).contains(&digits) {
        return Err(invalid("phone must contain 7 to 20 digits"));
    }
    Ok(value.to_string())
}

/// ISO country code: exactly two ASCII letters, uppercased.
pub fn country_code(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("country must be a two-letter code"));
    }
    Ok(value.to_ascii_uppercase())
}

/// Postal code: trimmed, 2..=12 chars, alphanumeric plus space and dash.
pub fn postcode(raw: &str) -> Result<String> {
    let value = raw.trim();
    if !(2..=12).contains(&value.len()) {
        return Err(invalid("postcode must be 2 to 12 characters"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
    {
        return Err(invalid("postcode contains invalid characters"));
    }
    Ok(value.to_string())
}

/// Ticket subject: trimmed, bounded, angle brackets stripped.
pub fn subject(raw: &str) -> Result<String> {
    let value: String = raw.trim().chars().filter(|&c| c != '<' && c != '>').collect();
    if value.trim().is_empty() {
        return Err(invalid("subject is required"));
    }
    if value.len() > MAX_SUBJECT_LEN {
        return Err(invalid("subject is too long"));
    }
    Ok(value.trim().to_string())
}

/// Ticket message body: trimmed and bounded.
pub fn message_body(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid("message is required"));
    }
    if value.len() > MAX_MESSAGE_LEN {
        return Err(invalid("message is too long"));
    }
    Ok(value.to_string())
}

/// Catalog identifier (plan id or product slug): lowercase alphanumeric
/// plus dashes, bounded.
pub fn slug(field: &str, raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() || value.len() > 64 {
        return Err(invalid(format!("{field} is not valid")));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(format!("{field} is not valid")));
    }
    Ok(value.to_string())
}
