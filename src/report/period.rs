use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::planning::WeekKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next_month_first?.pred_opt()?;
        Some(Self { start, end })
    }

    pub fn containing_month(date: NaiveDate) -> Option<Self> {
        Self::month(date.year(), date.month())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn weeks(&self) -> Vec<WeekKey> {
        let mut weeks = Vec::new();
        let mut week = Some(WeekKey::containing(self.start));
        while let Some(current) = week {
            if current.monday() > self.end {
                break;
            }
            weeks.push(current);
            week = current.next();
        }
        weeks
    }

    pub fn fragments(&self, week: WeekKey) -> bool {
        !(self.contains(week.monday()) && self.contains(week.sunday()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodSplit {
    pub before: f64,
    pub within: f64,
    pub after: f64,
}

impl PeriodSplit {
    pub fn total(&self) -> f64 {
        self.before + self.within + self.after
    }
}

pub fn split_hours_by_period(week: WeekKey, day_hours: &[f64; 7], period: &PayPeriod) -> PeriodSplit {
    let mut split = PeriodSplit::default();
    for (day, hours) in week.days().zip(day_hours) {
        if day < period.start {
            split.before += hours;
        } else if day > period.end {
            split.after += hours;
        } else {
            split.within += hours;
        }
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn month_period_covers_whole_month() {
        let period = PayPeriod::month(2024, 2).unwrap();
        assert_eq!(period.start, date(2024, 2, 1));
        assert_eq!(period.end, date(2024, 2, 29));

        let december = PayPeriod::month(2025, 12).unwrap();
        assert_eq!(december.end, date(2025, 12, 31));
    }

    #[test]
    fn invalid_month_is_none() {
        assert!(PayPeriod::month(2025, 13).is_none());
    }

    #[test]
    fn inverted_period_is_none() {
        assert!(PayPeriod::new(date(2025, 8, 2), date(2025, 8, 1)).is_none());
    }

    #[test]
    fn july_2025_spans_five_weeks() {
        let weeks = PayPeriod::month(2025, 7).unwrap().weeks();

        let mondays: Vec<_> = weeks.iter().map(|w| w.monday()).collect();
        assert_eq!(
            mondays,
            vec![
                date(2025, 6, 30),
                date(2025, 7, 7),
                date(2025, 7, 14),
                date(2025, 7, 21),
                date(2025, 7, 28),
            ]
        );
    }

    #[test]
    fn boundary_week_splits_into_three_parts() {
        let week = WeekKey::new(date(2025, 7, 28)).unwrap();
        let period = PayPeriod::new(date(2025, 7, 29), date(2025, 8, 2)).unwrap();
        let hours = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

        let split = split_hours_by_period(week, &hours, &period);

        assert_eq!(split, PeriodSplit { before: 1.0, within: 20.0, after: 7.0 });
        assert_eq!(split.total(), 28.0);
    }

    #[test]
    fn week_straddling_month_end_defers_august_days() {
        let week = WeekKey::new(date(2025, 7, 28)).unwrap();
        let july = PayPeriod::month(2025, 7).unwrap();
        let hours = [8.0, 8.0, 8.0, 8.0, 8.0, 4.0, 0.0];

        let split = split_hours_by_period(week, &hours, &july);

        assert_eq!(split.within, 32.0);
        assert_eq!(split.after, 12.0);
        assert_eq!(split.before, 0.0);
        assert!(july.fragments(week));
    }

    #[test]
    fn week_inside_month_is_not_fragmented() {
        let july = PayPeriod::month(2025, 7).unwrap();
        assert!(!july.fragments(WeekKey::new(date(2025, 7, 14)).unwrap()));
    }
}
