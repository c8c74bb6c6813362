pub mod csv;
pub mod period;
pub mod recap;

pub use csv::{format_euros, format_hours, monthly_recap_csv, payment_totals_csv, weekly_recap_csv};
pub use period::{split_hours_by_period, PayPeriod, PeriodSplit};
pub use recap::{
    employee_period_total, monthly_recap, payment_recap, weekly_recap, MonthlyRecapRow,
    WeekSegment, WeeklyRecapRow,
};
