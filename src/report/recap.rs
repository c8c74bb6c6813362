use serde::Serialize;
use tracing::debug;

use crate::hours::week_day_hours;
use crate::planning::{get_week_planning, EmployeeId, PlanningData, Shop, ShopId, WeekKey};
use crate::register::{totals_by_method, MethodTotal, Payment};
use crate::report::period::{split_hours_by_period, PayPeriod, PeriodSplit};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRecapRow {
    pub shop_id: ShopId,
    pub shop_name: String,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub week: WeekKey,
    pub day_hours: [f64; 7],
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSegment {
    pub week: WeekKey,
    pub fragmented: bool,
    pub split: PeriodSplit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRecapRow {
    pub shop_id: ShopId,
    pub shop_name: String,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub segments: Vec<WeekSegment>,
    pub total_hours: f64,
}

impl MonthlyRecapRow {
    pub fn already_paid_hours(&self) -> f64 {
        self.segments.iter().map(|s| s.split.before).sum()
    }

    pub fn deferred_hours(&self) -> f64 {
        self.segments.iter().map(|s| s.split.after).sum()
    }
}

fn employees_in_weeks<'a>(shop: &'a Shop, weeks: &[WeekKey]) -> Vec<&'a EmployeeId> {
    let mut ids: Vec<&EmployeeId> = shop.roster.iter().collect();
    for week in weeks.iter().filter_map(|w| shop.week(*w)) {
        for id in week.planning.keys() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

pub fn weekly_recap(data: &PlanningData, week: WeekKey) -> Vec<WeeklyRecapRow> {
    let mut rows = Vec::new();
    for shop in &data.shops {
        let Ok(week_data) = get_week_planning(data, &shop.id, week) else {
            continue;
        };
        for employee_id in employees_in_weeks(shop, &[week]) {
            let day_hours = week_day_hours(employee_id, week, &week_data, &shop.config);
            rows.push(WeeklyRecapRow {
                shop_id: shop.id.clone(),
                shop_name: shop.name.clone(),
                employee_id: employee_id.clone(),
                employee_name: data.employee_name(employee_id).to_string(),
                week,
                day_hours,
                total_hours: day_hours.iter().sum(),
            });
        }
    }
    debug!(%week, rows = rows.len(), "built weekly recap");
    rows
}

pub fn monthly_recap(data: &PlanningData, period: &PayPeriod) -> Vec<MonthlyRecapRow> {
    let weeks = period.weeks();
    let mut rows = Vec::new();

    for shop in &data.shops {
        for employee_id in employees_in_weeks(shop, &weeks) {
            let segments: Vec<WeekSegment> = weeks
                .iter()
                .map(|week| {
                    let day_hours = shop
                        .week(*week)
                        .map(|week_data| week_day_hours(employee_id, *week, week_data, &shop.config))
                        .unwrap_or([0.0; 7]);
                    WeekSegment {
                        week: *week,
                        fragmented: period.fragments(*week),
                        split: split_hours_by_period(*week, &day_hours, period),
                    }
                })
                .collect();

            rows.push(MonthlyRecapRow {
                shop_id: shop.id.clone(),
                shop_name: shop.name.clone(),
                employee_id: employee_id.clone(),
                employee_name: data.employee_name(employee_id).to_string(),
                total_hours: segments.iter().map(|s| s.split.within).sum(),
                segments,
            });
        }
    }
    debug!(start = %period.start, end = %period.end, rows = rows.len(), "built monthly recap");
    rows
}

pub fn employee_period_total(rows: &[MonthlyRecapRow], employee_id: &str) -> f64 {
    rows.iter()
        .filter(|row| row.employee_id == employee_id)
        .map(|row| row.total_hours)
        .sum()
}

pub fn payment_recap(payments: &[Payment], period: &PayPeriod) -> Vec<MethodTotal> {
    let in_period: Vec<Payment> = payments
        .iter()
        .filter(|payment| period.contains(payment.date()))
        .cloned()
        .collect();
    totals_by_method(&in_period)
}
