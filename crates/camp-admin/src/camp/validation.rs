//! Field checks shared by the registry services.

use super::error::CampError;

pub(crate) fn required(field: &str, value: &str) -> Result<String, CampError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CampError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text is stored as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Normalises a field of a partial update: `None` leaves the stored value,
/// `Some(None)` clears it.
pub(crate) fn clearable(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(optional)
}

pub(crate) fn capacity(value: i64) -> Result<u32, CampError> {
    if value <= 0 {
        return Err(CampError::validation("capacity must be a positive integer"));
    }
    u32::try_from(value).map_err(|_| CampError::validation("capacity is too large"))
}

/// Digits with an optional leading `+`; spaces and dashes are stripped.
pub(crate) fn phone(field: &str, value: &str) -> Result<String, CampError> {
    let compact: String = value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    if !(10..=13).contains(&digits.len()) || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(CampError::validation(format!(
            "{field} must contain 10 to 13 digits"
        )));
    }
    Ok(compact)
}

pub(crate) fn email(value: &str) -> Result<String, CampError> {
    let trimmed = value.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(CampError::validation(format!(
            "'{trimmed}' is not a valid email address"
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

pub(crate) fn optional_email(value: Option<String>) -> Result<Option<String>, CampError> {
    optional(value).map(|value| email(&value)).transpose()
}

/// Aadhaar numbers are twelve digits, often written in groups of four.
pub(crate) fn aadhaar(value: Option<String>) -> Result<Option<String>, CampError> {
    let Some(value) = optional(value) else {
        return Ok(None);
    };
    let digits: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    if digits.len() != 12 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(CampError::validation("aadhaar number must be 12 digits"));
    }
    Ok(Some(digits))
}
