//! Input validation utilities.
//!
//! Pure checks over request values, shared by the REST handlers and the CLI.
//! Each helper takes the caller's message so the wire error text stays with
//! the endpoint that owns it.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{HmsError, HmsResult};

/// Basic shape check: exactly one `@`, a non-empty local part, and a dot with
/// characters on both sides in the domain. No whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Accepts digits plus common separators (space, dash, plus, parentheses),
/// with at least ten digits overall.
pub fn is_valid_phone(phone: &str) -> bool {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')'));
    allowed && phone.chars().filter(|c| c.is_ascii_digit()).count() >= 10
}

/// At least eight characters with an upper-case letter, a lower-case letter
/// and a digit.
pub fn is_strong_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Trim `value` and reject blank strings with an invalid-input error carrying
/// `message`.
///
/// # Errors
///
/// Returns `HmsError::InvalidInput` when the trimmed value is empty.
pub fn non_blank(value: &str, message: &str) -> HmsResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HmsError::InvalidInput(message.to_owned()));
    }
    Ok(trimmed.to_owned())
}

/// Parse a date-only value, accepting `YYYY-MM-DD` on its own or followed by
/// a time component (`T...` or ` ...`), which is dropped. Dates of birth are
/// stored without time of day.
///
/// # Errors
///
/// Returns `HmsError::InvalidInput` carrying `message` when no date can be
/// extracted.
pub fn date_only(value: &str, message: &str) -> HmsResult<NaiveDate> {
    let value = value.trim();
    let date_part = value
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(value);
    date_part
        .parse::<NaiveDate>()
        .map_err(|_| HmsError::InvalidInput(message.to_owned()))
}

/// Parse an RFC 3339 timestamp and normalise it to UTC.
///
/// # Errors
///
/// Returns `HmsError::InvalidInput` carrying `message` when the value is not
/// a valid timestamp.
pub fn timestamp_utc(value: &str, message: &str) -> HmsResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| HmsError::InvalidInput(message.to_owned()))
}
