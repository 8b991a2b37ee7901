//! Pet age derived from a birth date.
//!
//! Age is never stored; it is computed against a caller-supplied "today" so
//! the result is deterministic in tests.

use chrono::{Datelike, NaiveDate};

/// Age in whole calendar months, displayed as years and months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PetAge {
    months: u32,
}

impl PetAge {
    /// Compute the age on `today` of a pet born on `birth`.
    ///
    /// A month only counts once its day-of-month has been reached. Birth dates
    /// in the future yield zero months.
    #[must_use]
    pub fn on(birth: NaiveDate, today: NaiveDate) -> Self {
        let year_diff = i64::from(today.year()) - i64::from(birth.year());
        let month_diff = i64::from(today.month()) - i64::from(birth.month());
        let mut months = year_diff * 12 + month_diff;
        if today.day() < birth.day() {
            months -= 1;
        }
        Self {
            months: u32::try_from(months.max(0)).unwrap_or(0),
        }
    }

    #[must_use]
    pub const fn years(self) -> u32 {
        self.months / 12
    }

    #[must_use]
    pub const fn remaining_months(self) -> u32 {
        self.months % 12
    }

    #[must_use]
    pub const fn total_months(self) -> u32 {
        self.months
    }
}

impl std::fmt::Display for PetAge {
    /// `11 months`, `1 year`, `2 years and 1 month`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let years = self.years();
        let months = self.remaining_months();
        match (years, months) {
            (0, m) => write!(f, "{m} {}", plural(m, "month")),
            (y, 0) => write!(f, "{y} {}", plural(y, "year")),
            (y, m) => write!(
                f,
                "{y} {} and {m} {}",
                plural(y, "year"),
                plural(m, "month")
            ),
        }
    }
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_exactly_one_year() {
        let age = PetAge::on(date(2023, 3, 14), date(2024, 3, 14));
        assert_eq!(age.to_string(), "1 year");
    }

    #[test]
    fn test_eleven_months() {
        let age = PetAge::on(date(2023, 4, 14), date(2024, 3, 14));
        assert_eq!(age.to_string(), "11 months");
    }

    #[test]
    fn test_day_not_yet_reached() {
        let age = PetAge::on(date(2023, 3, 20), date(2024, 3, 14));
        assert_eq!(age.to_string(), "11 months");
    }

    #[test]
    fn test_years_and_months() {
        assert_eq!(
            PetAge::on(date(2020, 1, 1), date(2022, 2, 1)).to_string(),
            "2 years and 1 month"
        );
        assert_eq!(
            PetAge::on(date(2021, 1, 1), date(2022, 4, 1)).to_string(),
            "1 year and 3 months"
        );
    }

    #[test]
    fn test_newborn_and_future() {
        assert_eq!(PetAge::on(date(2024, 3, 1), date(2024, 3, 14)).to_string(), "0 months");
        assert_eq!(PetAge::on(date(2025, 1, 1), date(2024, 3, 14)).total_months(), 0);
        assert_eq!(PetAge::on(date(2024, 2, 1), date(2024, 3, 1)).to_string(), "1 month");
    }
}
