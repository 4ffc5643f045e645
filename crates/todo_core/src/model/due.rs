use crate::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Turns raw date-picker input into the stored form: a UTC RFC 3339 instant.
///
/// Blank input means "no due date". A bare `YYYY-MM-DD` is read as midnight UTC.
pub fn normalize_due_input(raw: Option<&str>) -> Result<Option<String>, AppError> {
    let trimmed = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(None),
    };

    let instant = parse_instant(trimmed).ok_or_else(|| {
        AppError::invalid_input("due date must be YYYY-MM-DD or an RFC3339 datetime")
    })?;
    let formatted = instant
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;

    Ok(Some(formatted))
}

/// The instant a stored due value refers to, if it parses.
pub fn due_instant(due: &str) -> Option<OffsetDateTime> {
    parse_instant(due.trim())
}

/// Calendar-date form (`YYYY-MM-DD`, UTC) used to pre-fill the date picker.
pub fn calendar_date(due: &str) -> Option<String> {
    due_instant(due)?
        .to_offset(UtcOffset::UTC)
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .ok()
}

/// `MM/DD/YYYY` in the given offset, or `-` when absent or unparsable.
pub fn format_due(due: Option<&str>, offset: UtcOffset) -> String {
    due.and_then(due_instant)
        .and_then(|instant| {
            instant
                .to_offset(offset)
                .date()
                .format(format_description!("[month]/[day]/[year]"))
                .ok()
        })
        .unwrap_or_else(|| "-".to_string())
}

fn parse_instant(value: &str) -> Option<OffsetDateTime> {
    if let Ok(instant) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(instant);
    }

    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}
