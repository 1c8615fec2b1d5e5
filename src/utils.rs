use chrono::{Datelike, Days, NaiveDate};

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

pub fn is_month_end(date: NaiveDate) -> bool {
    last_day_of_month(date.year(), date.month()) == Some(date)
}

/// Moves `date` forward by `months`, clamping the day to the target month's length.
/// A month-end start stays on month ends.
pub fn add_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = date.year() as i64 * 12 + (date.month0() as i64) + months as i64;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;
    let month_end = last_day_of_month(year, month)?;

    if is_month_end(date) {
        return Some(month_end);
    }
    let day = date.day().min(month_end.day());
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), Some(ymd(2024, 2, 29)));
        assert_eq!(last_day_of_month(2023, 2), Some(ymd(2023, 2, 28)));
        assert_eq!(last_day_of_month(2023, 12), Some(ymd(2023, 12, 31)));
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months_clamped(ymd(2025, 1, 31), 1), Some(ymd(2025, 2, 28)));
        assert_eq!(add_months_clamped(ymd(2025, 1, 15), 13), Some(ymd(2026, 2, 15)));
        assert_eq!(add_months_clamped(ymd(2025, 1, 30), 1), Some(ymd(2025, 2, 28)));
        assert_eq!(add_months_clamped(ymd(2025, 1, 30), 2), Some(ymd(2025, 3, 30)));
    }

    #[test]
    fn test_month_end_start_stays_on_month_ends() {
        assert_eq!(add_months_clamped(ymd(2025, 2, 28), 1), Some(ymd(2025, 3, 31)));
        assert_eq!(add_months_clamped(ymd(2024, 4, 30), 10), Some(ymd(2025, 2, 28)));
    }
}
