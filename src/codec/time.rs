//! Conversion between `H:MM:SS.CC` display strings and integer centiseconds.

use thiserror::Error;

const CENTIS_PER_SECOND: u64 = 100;
const CENTIS_PER_MINUTE: u64 = 60 * CENTIS_PER_SECOND;
const CENTIS_PER_HOUR: u64 = 60 * CENTIS_PER_MINUTE;

/// The hours field of [`encode`] wraps at this value, like a 24-hour clock.
pub const HOURS_WRAP: u64 = 24;

/// Largest value [`encode`] renders without wrapping, exclusive.
pub const ENCODE_LIMIT: u64 = HOURS_WRAP * CENTIS_PER_HOUR;

/// Error raised when a time string cannot be turned into centiseconds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFormatError {
    /// The text did not split into hours, minutes, seconds and centiseconds.
    #[error("expected 4 time fields (hours:minutes:seconds.centiseconds), got {0}")]
    FieldCount(usize),
    /// One of the fields was not a non-negative integer.
    #[error("time field `{0}` is not a non-negative integer")]
    NotNumeric(String),
    /// The fields add up to more than fits in a score.
    #[error("time value is too large")]
    Overflow,
}

/// Render a centisecond count as `H:MM:SS.CC`.
///
/// Hours wrap modulo [`HOURS_WRAP`], so runs of a day or longer display as if
/// the clock rolled over. Minutes, seconds and centiseconds are always two
/// digits; hours carry no leading zero.
pub fn encode(centis: u64) -> String {
    let hours = (centis / CENTIS_PER_HOUR) % HOURS_WRAP;
    let minutes = (centis / CENTIS_PER_MINUTE) % 60;
    let seconds = (centis / CENTIS_PER_SECOND) % 60;
    let rest = centis % CENTIS_PER_SECOND;
    format!("{hours}:{minutes:02}:{seconds:02}.{rest:02}")
}

/// Parse `hours:minutes:seconds.centiseconds` back into centiseconds.
///
/// Fields may be separated by either `:` or `.`, and surrounding whitespace
/// inside a field is ignored. Field values are not range checked: `0:75:00.00`
/// is read as 75 minutes.
pub fn decode(text: &str) -> Result<u64, TimeFormatError> {
    let fields: Vec<&str> = text.split([':', '.']).collect();
    let [hours, minutes, seconds, centis] = fields.as_slice() else {
        return Err(TimeFormatError::FieldCount(fields.len()));
    };

    let total = [
        (hours, CENTIS_PER_HOUR),
        (minutes, CENTIS_PER_MINUTE),
        (seconds, CENTIS_PER_SECOND),
        (centis, 1),
    ]
    .into_iter()
    .try_fold(0u64, |acc, (field, unit)| {
        let value = parse_field(field)?;
        value
            .checked_mul(unit)
            .and_then(|part| acc.checked_add(part))
            .ok_or(TimeFormatError::Overflow)
    })?;

    Ok(total)
}

fn parse_field(field: &str) -> Result<u64, TimeFormatError> {
    let trimmed = field.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeFormatError::NotNumeric(field.to_owned()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| TimeFormatError::Overflow)
}
