//! Lesson time windows as minutes from midnight.

use thiserror::Error;

/// Errors from parsing HH:mm time strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    /// Input did not match the HH:mm shape.
    #[error("invalid time format, expected HH:mm, got {0:?}")]
    Format(String),

    /// Hour or minute out of range.
    #[error("invalid time value: {0}")]
    Range(String),
}

/// Parses an "HH:mm" string into minutes from midnight.
///
/// # Errors
///
/// Returns `TimeParseError` for malformed input or out-of-range values.
pub fn hhmm_to_minutes(hhmm: &str) -> Result<u16, TimeParseError> {
    let (h, m) = hhmm
        .split_once(':')
        .ok_or_else(|| TimeParseError::Format(hhmm.to_string()))?;

    if h.len() != 2 || m.len() != 2 {
        return Err(TimeParseError::Format(hhmm.to_string()));
    }

    let hours: u16 = h
        .parse()
        .map_err(|_| TimeParseError::Format(hhmm.to_string()))?;
    let minutes: u16 = m
        .parse()
        .map_err(|_| TimeParseError::Format(hhmm.to_string()))?;

    if hours > 23 || minutes > 59 {
        return Err(TimeParseError::Range(hhmm.to_string()));
    }

    Ok(hours * 60 + minutes)
}

/// Formats minutes from midnight as "HH:mm".
#[must_use]
pub fn minutes_to_hhmm(mins: u16) -> String {
    format!("{:02}:{:02}", mins / 60, mins % 60)
}

/// Returns true if the half-open minute ranges `[a_start, a_end)` and
/// `[b_start, b_end)` overlap.
#[must_use]
pub const fn ranges_overlap(a_start: u16, a_end: u16, b_start: u16, b_end: u16) -> bool {
    a_start < b_end && b_start < a_end
}
