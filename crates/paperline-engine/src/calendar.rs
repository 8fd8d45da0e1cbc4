//! Month arithmetic for timeline spacing.

use chrono::{Datelike, Months, NaiveDate};

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => {
            u32::try_from(next.signed_duration_since(first).num_days()).unwrap_or(31)
        }
        _ => 31,
    }
}

/// Position of a date on a continuous month axis.
///
/// Whole months come from the calendar; the day contributes the fraction of
/// its month already elapsed, so the first of a month lands on an integer.
pub fn month_position(date: NaiveDate) -> f64 {
    let whole = f64::from(date.year()) * 12.0 + f64::from(date.month0());
    whole + f64::from(date.day0()) / f64::from(days_in_month(date))
}

/// Fractional months from `from` to `to` (negative when `to` is earlier).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> f64 {
    month_position(to) - month_position(from)
}

/// Advance `date` by a fractional number of months, flooring the fraction.
///
/// Negative or non-finite inputs clamp to `date`.
pub fn add_months_floor(date: NaiveDate, months: f64) -> NaiveDate {
    if !months.is_finite() || months <= 0.0 {
        return date;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = months.floor().min(f64::from(u32::MAX)) as u32;
    date.checked_add_months(Months::new(whole)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2023, 2, 10)), 28);
        assert_eq!(days_in_month(date(2023, 12, 31)), 31);
        assert_eq!(days_in_month(date(2023, 4, 1)), 30);
    }

    #[test]
    fn test_whole_years() {
        assert!((months_between(date(2015, 1, 1), date(2020, 1, 1)) - 60.0).abs() < f64::EPSILON);
        assert!(months_between(date(2022, 1, 1), date(2022, 1, 1)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_day_fraction() {
        // Apr has 30 days; the 16th is 15/30 of the way through.
        let months = months_between(date(2023, 4, 1), date(2023, 4, 16));
        assert!((months - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_negative_when_reversed() {
        assert!(months_between(date(2020, 6, 1), date(2020, 1, 1)) < 0.0);
    }

    #[test]
    fn test_add_months_floor() {
        assert_eq!(add_months_floor(date(2017, 8, 1), 5.9), date(2018, 1, 1));
        assert_eq!(add_months_floor(date(2017, 8, 1), -3.0), date(2017, 8, 1));
        assert_eq!(add_months_floor(date(2017, 8, 1), f64::NAN), date(2017, 8, 1));
    }
}
