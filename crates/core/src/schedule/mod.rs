//! Lesson-day calendar rules and time windows.
//!
//! Groups meet on one of two fixed weekday patterns; lesson times are
//! stored as minutes from midnight. Everything here is pure calendar
//! arithmetic shared by tuition charging, attendance sheets, and room
//! scheduling.

pub mod calendar;
pub mod time;

#[cfg(test)]
mod tests;

pub use calendar::{DaysPattern, lesson_dates_in_month};
pub use time::{TimeParseError, hhmm_to_minutes, minutes_to_hhmm, ranges_overlap};
