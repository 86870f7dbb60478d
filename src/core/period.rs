use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// A calendar month, `month` in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month before this one; January wraps to December of the prior year.
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(self) -> u32 {
        let next = self.next();
        match (self.first_day(), next.first_day()) {
            (Some(start), Some(end)) => (end - start).num_days() as u32,
            _ => 0,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn previous_of_january_is_december_of_prior_year() {
        let january = MonthKey::of(date(2025, 1, 10));
        assert_eq!(january.previous(), MonthKey { year: 2024, month: 12 });
        assert!(january.previous().contains(date(2024, 12, 31)));
        assert!(!january.previous().contains(date(2025, 12, 31)));
    }

    #[test]
    fn previous_mid_year_stays_in_year() {
        assert_eq!(
            MonthKey::of(date(2024, 6, 1)).previous(),
            MonthKey { year: 2024, month: 5 }
        );
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(MonthKey { year: 2024, month: 2 }.days_in_month(), 29);
        assert_eq!(MonthKey { year: 2023, month: 2 }.days_in_month(), 28);
        assert_eq!(MonthKey { year: 2024, month: 12 }.days_in_month(), 31);
    }
}
