use chrono::{NaiveDate, Weekday};
use rstest::rstest;

use super::calendar::{DaysPattern, lesson_dates_in_month};
use super::time::{TimeParseError, hhmm_to_minutes, minutes_to_hhmm, ranges_overlap};

#[test]
fn test_odd_pattern_weekdays() {
    assert!(DaysPattern::Odd.includes(Weekday::Mon));
    assert!(DaysPattern::Odd.includes(Weekday::Wed));
    assert!(DaysPattern::Odd.includes(Weekday::Fri));
    assert!(!DaysPattern::Odd.includes(Weekday::Tue));
    assert!(!DaysPattern::Odd.includes(Weekday::Sun));
}

#[test]
fn test_even_pattern_weekdays() {
    assert!(DaysPattern::Even.includes(Weekday::Tue));
    assert!(DaysPattern::Even.includes(Weekday::Thu));
    assert!(DaysPattern::Even.includes(Weekday::Sat));
    assert!(!DaysPattern::Even.includes(Weekday::Mon));
    assert!(!DaysPattern::Even.includes(Weekday::Sun));
}

#[test]
fn test_sunday_never_a_lesson_day() {
    assert!(!DaysPattern::Odd.includes(Weekday::Sun));
    assert!(!DaysPattern::Even.includes(Weekday::Sun));
}

#[test]
fn test_lesson_dates_june_2026_odd() {
    // June 2026 starts on a Monday; ODD gives 13 lesson days.
    let dates = lesson_dates_in_month(DaysPattern::Odd, 2026, 6);
    assert_eq!(dates.len(), 13);
    assert_eq!(dates[0], NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
    assert_eq!(*dates.last().unwrap(), NaiveDate::from_ymd_opt(2026, 6, 29).unwrap());
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_lesson_dates_stay_inside_month() {
    for month in 1..=12 {
        for pattern in [DaysPattern::Odd, DaysPattern::Even] {
            let dates = lesson_dates_in_month(pattern, 2026, month);
            // Three weekdays per week always land 12-14 times a month.
            assert!((12..=14).contains(&dates.len()), "month {month}");
            assert!(dates.iter().all(|d| chrono::Datelike::month(d) == month));
        }
    }
}

#[test]
fn test_lesson_dates_invalid_month_is_empty() {
    assert!(lesson_dates_in_month(DaysPattern::Odd, 2026, 13).is_empty());
    assert!(lesson_dates_in_month(DaysPattern::Even, 2026, 0).is_empty());
}

#[rstest]
#[case("00:00", 0)]
#[case("09:30", 570)]
#[case("14:05", 845)]
#[case("23:59", 1439)]
fn test_hhmm_parse(#[case] input: &str, #[case] expected: u16) {
    assert_eq!(hhmm_to_minutes(input).unwrap(), expected);
}

#[rstest]
#[case("9:30")]
#[case("0930")]
#[case("ab:cd")]
#[case("")]
fn test_hhmm_parse_rejects_malformed(#[case] input: &str) {
    assert!(matches!(
        hhmm_to_minutes(input),
        Err(TimeParseError::Format(_))
    ));
}

#[rstest]
#[case("24:00")]
#[case("12:60")]
fn test_hhmm_parse_rejects_out_of_range(#[case] input: &str) {
    assert!(matches!(hhmm_to_minutes(input), Err(TimeParseError::Range(_))));
}

#[test]
fn test_minutes_round_trip() {
    for mins in [0u16, 570, 845, 1439] {
        assert_eq!(hhmm_to_minutes(&minutes_to_hhmm(mins)).unwrap(), mins);
    }
}

#[test]
fn test_ranges_overlap() {
    assert!(ranges_overlap(540, 630, 600, 690));
    assert!(ranges_overlap(600, 690, 540, 630));
    assert!(ranges_overlap(540, 630, 550, 560));
    // Touching endpoints do not overlap.
    assert!(!ranges_overlap(540, 630, 630, 720));
    assert!(!ranges_overlap(630, 720, 540, 630));
    assert!(!ranges_overlap(540, 600, 660, 720));
}
