//! Weekday patterns and lesson-day enumeration.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weekly recurrence pattern for a group.
///
/// ODD groups meet Monday/Wednesday/Friday, EVEN groups Tuesday/Thursday/
/// Saturday. Sunday is never a lesson day. This is a fixed domain rule,
/// not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DaysPattern {
    /// Monday, Wednesday, Friday.
    Odd,
    /// Tuesday, Thursday, Saturday.
    Even,
}

impl DaysPattern {
    /// The three weekdays this pattern meets on.
    #[must_use]
    pub const fn weekdays(self) -> [Weekday; 3] {
        match self {
            Self::Odd => [Weekday::Mon, Weekday::Wed, Weekday::Fri],
            Self::Even => [Weekday::Tue, Weekday::Thu, Weekday::Sat],
        }
    }

    /// Returns true if `weekday` is a lesson day under this pattern.
    #[must_use]
    pub fn includes(self, weekday: Weekday) -> bool {
        self.weekdays().contains(&weekday)
    }
}

impl std::fmt::Display for DaysPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Odd => write!(f, "ODD"),
            Self::Even => write!(f, "EVEN"),
        }
    }
}

impl std::str::FromStr for DaysPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ODD" => Ok(Self::Odd),
            "EVEN" => Ok(Self::Even),
            _ => Err(format!("Unknown days pattern: {s}")),
        }
    }
}

/// Enumerates every lesson date in the given calendar month, in order.
///
/// Returns an empty vector if `year`/`month` do not name a valid month.
#[must_use]
pub fn lesson_dates_in_month(pattern: DaysPattern, year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| pattern.includes(d.weekday()))
        .collect()
}
