//! Billing period: the `YYYY-MM` key that identifies a rent month.

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

static PERIOD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("valid period pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillingPeriod {
    first_day: NaiveDate,
}

impl BillingPeriod {
    /// Parse a `YYYY-MM` string. The month part must be 01-12.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let value = value.trim();
        if !PERIOD_PATTERN.is_match(value) {
            return Err(DomainError::invalid("month", "Month must be in YYYY-MM format"));
        }
        let first_day = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
            .map_err(|_| DomainError::invalid("month", "Month must be in YYYY-MM format"))?;
        Ok(Self { first_day })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The period containing today's local date
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// All twelve periods of a calendar year, January first
    pub fn months_of_year(year: i32) -> Vec<Self> {
        (1..=12)
            .filter_map(|month| NaiveDate::from_ymd_opt(year, month, 1))
            .map(|first_day| Self { first_day })
            .collect()
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Rent falls due on the last day of its month
    pub fn due_date(&self) -> NaiveDate {
        self.first_day + Months::new(1) - Days::new(1)
    }

    /// e.g. "March 2024"
    pub fn long_name(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }

    /// e.g. "Mar"
    pub fn short_month_name(&self) -> String {
        self.first_day.format("%b").to_string()
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_period() {
        let period = BillingPeriod::parse("2024-03").unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 3);
        assert_eq!(period.to_string(), "2024-03");
    }

    #[test]
    fn test_parse_rejects_malformed_periods() {
        for bad in ["2024-3", "24-03", "2024/03", "2024-13", "2024-00", "", "March 2024"] {
            assert!(BillingPeriod::parse(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_due_date_is_last_day_of_month() {
        let cases = [
            ("2024-02", (2024, 2, 29)),
            ("2023-02", (2023, 2, 28)),
            ("2024-04", (2024, 4, 30)),
            ("2024-12", (2024, 12, 31)),
        ];
        for (period, (y, m, d)) in cases {
            let due = BillingPeriod::parse(period).unwrap().due_date();
            assert_eq!(due, NaiveDate::from_ymd_opt(y, m, d).unwrap());
        }
    }

    #[test]
    fn test_names() {
        let period = BillingPeriod::parse("2024-03").unwrap();
        assert_eq!(period.long_name(), "March 2024");
        assert_eq!(period.short_month_name(), "Mar");
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let earlier = BillingPeriod::parse("2023-12").unwrap();
        let later = BillingPeriod::parse("2024-01").unwrap();
        assert!(earlier < later);
        assert_eq!(
            BillingPeriod::from_date(NaiveDate::from_ymd_opt(2024, 1, 17).unwrap()),
            later
        );
    }

    #[test]
    fn test_months_of_year() {
        let months = BillingPeriod::months_of_year(2024);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].to_string(), "2024-01");
        assert_eq!(months[11].to_string(), "2024-12");
    }
}
